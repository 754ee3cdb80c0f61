use crate::{AgentId, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read-only world access.
///
/// The core crate intentionally does not prescribe which queries a world must
/// expose; specific subsystems (perception, pathfinding, etc.) should define
/// extension traits.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}

/// Queries a mob-controlling world exposes about its agents.
pub trait MobWorldView: WorldView {
    fn position(&self, agent: Self::Agent) -> Option<Vec3>;

    fn facing(&self, agent: Self::Agent) -> Option<Vec3>;

    /// The agent's current attack/interaction target, if any.
    fn target_of(&self, agent: Self::Agent) -> Option<Self::Agent>;
}

/// Actuator requests.
///
/// Goals and behaviors never mutate agents directly; they file requests and
/// the engine integrates them after the AI pass. Capability flags keep two
/// owners from filing conflicting requests in the same tick.
pub trait MobWorldMut: WorldMut + MobWorldView {
    fn request_move(&mut self, agent: Self::Agent, to: Vec3, speed: f32);

    fn clear_move(&mut self, agent: Self::Agent);

    fn request_look(&mut self, agent: Self::Agent, at: Vec3);

    fn request_jump(&mut self, agent: Self::Agent);

    fn set_target(&mut self, agent: Self::Agent, target: Option<Self::Agent>);
}

/// Handle for an in-flight pathfinding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathTicket(pub u64);

/// Extension for worlds that compute paths asynchronously over several ticks.
///
/// Goals and behaviors only poll these; the search itself runs elsewhere.
pub trait PathWorldView: WorldView {
    /// Still being computed or followed.
    fn path_in_progress(&self, ticket: PathTicket) -> bool;

    /// Finished: the agent arrived or the path was found unreachable.
    fn path_done(&self, ticket: PathTicket) -> bool;
}

pub trait PathWorldMut: WorldMut + PathWorldView {
    fn request_path(&mut self, agent: Self::Agent, to: Vec3) -> PathTicket;

    fn cancel_path(&mut self, ticket: PathTicket);
}
