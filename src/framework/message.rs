//! # Generic Messages
//!
//! Requests sent from a `ResourceClient` to its `ResourceActor`. Each variant
//! carries a oneshot sender the actor answers on.

use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The single-record variants map to CRUD plus `Action`. The collection
/// variants (`List`, `Upsert`, `UpdateWhere`, `DeleteWhere`) are what a client
/// needs from a durable store beyond single-id access: queries by foreign key,
/// fetch-or-create by unique key and bulk flag changes.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Upsert {
        params: T::Create,
        update: T::Update,
        respond_to: Response<T>,
    },
    UpdateWhere {
        filter: T::Filter,
        update: T::Update,
        respond_to: Response<usize>,
    },
    DeleteWhere {
        filter: T::Filter,
        respond_to: Response<usize>,
    },
}

impl<T: ActorEntity> ResourceRequest<T> {
    /// Short name of the operation, for logs and mock diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Get { .. } => "get",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Action { .. } => "action",
            Self::List { .. } => "list",
            Self::Upsert { .. } => "upsert",
            Self::UpdateWhere { .. } => "update_where",
            Self::DeleteWhere { .. } => "delete_where",
        }
    }
}
