use crate::types::BodyHandle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("body {body:?} already holds its maximum of {capacity} colliders")]
    ColliderCapacity { body: BodyHandle, capacity: usize },
    #[error("unknown body: {0:?}")]
    UnknownBody(BodyHandle),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
