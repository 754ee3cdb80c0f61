use mob_core::{Blackboard, KeyId, TickContext, WorldView};

/// Default sensing cadence, in ticks.
pub const DEFAULT_SENSE_INTERVAL: u32 = 20;

/// Periodic, read-only world observer.
///
/// Sensors are the only place world state enters the blackboard; behaviors
/// then act on the written facts. A sensor must not mutate the world or read
/// behavior-internal state. Sensors fire in registration order, so a sensor
/// may build on keys written by earlier sensors in the same tick.
pub trait Sensor<W>: 'static
where
    W: WorldView + 'static,
{
    /// Keys this sensor may write, for build-time schema validation.
    fn writes(&self) -> Vec<KeyId>;

    /// Ticks between runs. The brain staggers the phase per agent so a herd
    /// of mobs with the same cadence does not sense on the same tick.
    fn interval(&self) -> u32 {
        DEFAULT_SENSE_INTERVAL
    }

    fn sense(&mut self, ctx: &TickContext, agent: W::Agent, world: &W, blackboard: &mut Blackboard);
}
