use sea_orm::DatabaseConnection;

use crate::infra::cache::KvStore;
use crate::infra::db::{
    DbAccountRepository, DbAssignmentRepository, DbContentRepository, DbMentorRepository,
    DbMentorRequestRepository, DbProgramRepository, DbStudentRepository,
};
use crate::infra::lookup::HttpLookupProvider;
use crate::infra::memory::SystemClock;
use crate::infra::notify::NotificationQueue;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub kv: KvStore,
    pub notifier: NotificationQueue,
    pub lookup_provider: HttpLookupProvider,
    pub site_base_url: String,
    pub trusted_proxy_hops: usize,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn student_repo(&self) -> DbStudentRepository {
        DbStudentRepository {
            db: self.db.clone(),
        }
    }

    pub fn mentor_repo(&self) -> DbMentorRepository {
        DbMentorRepository {
            db: self.db.clone(),
        }
    }

    pub fn request_repo(&self) -> DbMentorRequestRepository {
        DbMentorRequestRepository {
            db: self.db.clone(),
        }
    }

    pub fn assignment_repo(&self) -> DbAssignmentRepository {
        DbAssignmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn content_repo(&self) -> DbContentRepository {
        DbContentRepository {
            db: self.db.clone(),
        }
    }

    pub fn program_repo(&self) -> DbProgramRepository {
        DbProgramRepository {
            db: self.db.clone(),
        }
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}
