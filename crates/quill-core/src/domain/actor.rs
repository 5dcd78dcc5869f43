use uuid::Uuid;

/// The authenticated identity performing an operation, as far as the
/// domain layer needs to know it.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub admin: bool,
}

impl Actor {
    /// Whether this actor may operate on a record owned by `owner`.
    pub fn may_touch(&self, owner: Uuid) -> bool {
        self.admin || self.id == owner
    }
}
