use serde::{Deserialize, Serialize};

use crate::model::role::Role;
use crate::store::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub employee_id: Option<u64>,
    pub is_active: bool,
    #[serde(default)]
    pub version: u64,
}

impl Entity for UserAccount {
    const KIND: &'static str = "User";
    const IMMUTABLE: &'static [&'static str] = &["id", "username", "version"];

    fn id(&self) -> u64 {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}
