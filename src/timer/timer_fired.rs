//! 定时器到期事件

use std::marker::PhantomData;

use super::table::TimerId;
use super::TimerHost;
use crate::sim::{Event, Simulator, World};

/// 事件：某个定时器的一次到期。`generation` 用于识别已被取消/重排的旧事件。
pub struct TimerFired<H> {
    pub id: TimerId,
    pub generation: u64,
    _host: PhantomData<fn() -> H>,
}

impl<H> TimerFired<H> {
    pub fn new(id: TimerId, generation: u64) -> Self {
        Self {
            id,
            generation,
            _host: PhantomData,
        }
    }
}

impl<H: TimerHost> Event for TimerFired<H> {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let TimerFired { id, generation, .. } = *self;
        let host = world
            .as_any_mut()
            .downcast_mut::<H>()
            .expect("world must be the timer host");
        if let Some(target) = host.timers().fire(id, generation, sim) {
            host.on_timer(id, target, sim);
        }
    }
}
