mod activity;
mod notifications;
mod registrations;
mod rooms;
pub(crate) mod row_helpers;
mod students;
mod tenants;
mod users;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::config::Config;
use crate::models::*;

/// Typed error for "resource not found": enables reliable downcast
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for uniqueness and state-transition conflicts (HTTP 409)
#[derive(Debug)]
pub struct ConflictError {
    pub message: String,
}

impl ConflictError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConflictError {}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run migrations
    pub async fn from_pool(pool: Pool<Sqlite>) -> Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Seed the platform superadmin and the demo tenant.
    /// Returns the demo tenant so the resolver can pin it.
    pub async fn seed(&self, cfg: &Config) -> Result<Option<Tenant>> {
        self.seed_superadmin(cfg).await?;
        self.seed_demo_tenant(cfg).await
    }

    async fn seed_superadmin(&self, cfg: &Config) -> Result<()> {
        if !users::UserRepo::list_by_role(&self.pool, Role::Superadmin).await?.is_empty() {
            return Ok(());
        }

        let password = if cfg.superadmin_password.is_empty() {
            let generated = uuid::Uuid::new_v4().simple().to_string();
            tracing::warn!(
                "SUPERADMIN_PASSWORD not set - generated password for {}: {}",
                cfg.superadmin_email,
                generated
            );
            generated
        } else {
            cfg.superadmin_password.clone()
        };

        let password_hash = bcrypt::hash(&password, cfg.bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash superadmin password: {}", e))?;

        self.create_user(&NewUser {
            email: cfg.superadmin_email.to_ascii_lowercase(),
            name: "Platform Admin".to_string(),
            password_hash,
            role: Role::Superadmin,
            tenant_id: None,
        })
        .await?;
        tracing::info!("Created superadmin user ({})", cfg.superadmin_email);
        Ok(())
    }

    async fn seed_demo_tenant(&self, cfg: &Config) -> Result<Option<Tenant>> {
        let slug = &cfg.tenancy.demo_slug;
        if slug.is_empty() {
            return Ok(None);
        }

        let tenant = match self.get_tenant_by_subdomain(slug).await? {
            Some(t) => t,
            None => {
                let t = self.create_tenant("Demo Hostel", slug).await?;
                tracing::info!("Created demo tenant '{}' (id={})", slug, t.id);
                t
            }
        };

        if self.list_tenant_users(tenant.id).await?.is_empty() {
            // Nobody logs in with this password; the demo page signs in directly
            let password_hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cfg.bcrypt_cost)
                .map_err(|e| anyhow::anyhow!("Failed to hash demo password: {}", e))?;
            self.create_user(&NewUser {
                email: format!("demo@{}", cfg.tenancy.apex_domain),
                name: "Demo Admin".to_string(),
                password_hash,
                role: Role::Admin,
                tenant_id: Some(tenant.id),
            })
            .await?;
        }

        Ok(Some(tenant))
    }

    // ========== Tenant Operations ==========

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        tenants::TenantRepo::list(&self.pool).await
    }

    pub async fn get_tenant(&self, id: i64) -> Result<Option<Tenant>> {
        tenants::TenantRepo::get(&self.pool, id).await
    }

    pub async fn get_tenant_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>> {
        tenants::TenantRepo::get_by_subdomain(&self.pool, subdomain).await
    }

    pub async fn create_tenant(&self, name: &str, subdomain: &str) -> Result<Tenant> {
        tenants::TenantRepo::create(&self.pool, name, subdomain).await
    }

    pub async fn set_tenant_active(&self, id: i64, active: bool) -> Result<Tenant> {
        tenants::TenantRepo::set_active(&self.pool, id, active).await
    }

    // ========== User Operations ==========

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        users::UserRepo::get_by_email(&self.pool, email).await
    }

    pub async fn list_superadmins(&self) -> Result<Vec<User>> {
        users::UserRepo::list_by_role(&self.pool, Role::Superadmin).await
    }

    pub async fn list_tenant_users(&self, tenant_id: i64) -> Result<Vec<User>> {
        users::UserRepo::list_for_tenant(&self.pool, tenant_id).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        users::UserRepo::create(&self.pool, user).await
    }

    // ========== Registration Operations ==========

    pub async fn list_registrations(&self, status: Option<RegistrationStatus>) -> Result<Vec<RegistrationRequest>> {
        registrations::RegistrationRepo::list(&self.pool, status).await
    }

    pub async fn get_registration(&self, id: i64) -> Result<Option<RegistrationRequest>> {
        registrations::RegistrationRepo::get(&self.pool, id).await
    }

    pub async fn is_subdomain_taken(&self, subdomain: &str) -> Result<bool> {
        registrations::RegistrationRepo::is_subdomain_taken(&self.pool, subdomain).await
    }

    pub async fn create_registration(&self, req: &NewRegistration) -> Result<Option<RegistrationRequest>> {
        registrations::RegistrationRepo::create_pending(&self.pool, req).await
    }

    pub async fn approve_registration(&self, id: i64, reviewer_id: i64) -> Result<ApprovedRegistration> {
        registrations::RegistrationRepo::approve(&self.pool, id, reviewer_id).await
    }

    pub async fn reject_registration(&self, id: i64, reviewer_id: i64, reason: &str) -> Result<RegistrationRequest> {
        registrations::RegistrationRepo::reject(&self.pool, id, reviewer_id, reason).await
    }

    // ========== Notification Operations ==========

    pub async fn create_notification(&self, user_id: i64, title: &str, message: &str) -> Result<()> {
        notifications::NotificationRepo::create(&self.pool, user_id, title, message).await
    }

    pub async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        notifications::NotificationRepo::list_for_user(&self.pool, user_id).await
    }

    pub async fn mark_notification_read(&self, user_id: i64, id: i64) -> Result<()> {
        notifications::NotificationRepo::mark_read(&self.pool, user_id, id).await
    }

    // ========== Activity Log Operations ==========

    pub async fn log_activity(&self, entry: &NewActivity) -> Result<()> {
        activity::ActivityRepo::create(&self.pool, entry).await
    }

    pub async fn list_activity(&self, tenant_id: i64, limit: i32) -> Result<Vec<ActivityLog>> {
        activity::ActivityRepo::list_for_tenant(&self.pool, tenant_id, limit).await
    }

    pub async fn list_all_activity(&self, limit: i32) -> Result<Vec<ActivityLog>> {
        activity::ActivityRepo::list_all(&self.pool, limit).await
    }

    // ========== Room Operations (tenant-scoped) ==========

    pub async fn list_rooms(&self, tenant_id: i64) -> Result<Vec<Room>> {
        rooms::RoomRepo::list(&self.pool, tenant_id).await
    }

    pub async fn get_room(&self, tenant_id: i64, id: i64) -> Result<Option<Room>> {
        rooms::RoomRepo::get(&self.pool, tenant_id, id).await
    }

    pub async fn create_room(&self, tenant_id: i64, req: &CreateRoomRequest) -> Result<Room> {
        rooms::RoomRepo::create(&self.pool, tenant_id, req).await
    }

    pub async fn update_room(&self, tenant_id: i64, id: i64, req: &CreateRoomRequest) -> Result<Room> {
        rooms::RoomRepo::update(&self.pool, tenant_id, id, req).await
    }

    pub async fn delete_room(&self, tenant_id: i64, id: i64) -> Result<()> {
        rooms::RoomRepo::delete(&self.pool, tenant_id, id).await
    }

    // ========== Student Operations (tenant-scoped) ==========

    pub async fn list_students(&self, tenant_id: i64) -> Result<Vec<Student>> {
        students::StudentRepo::list(&self.pool, tenant_id).await
    }

    pub async fn get_student(&self, tenant_id: i64, id: i64) -> Result<Option<Student>> {
        students::StudentRepo::get(&self.pool, tenant_id, id).await
    }

    pub async fn create_student(&self, tenant_id: i64, req: &CreateStudentRequest) -> Result<Student> {
        students::StudentRepo::create(&self.pool, tenant_id, req).await
    }

    pub async fn delete_student(&self, tenant_id: i64, id: i64) -> Result<()> {
        students::StudentRepo::delete(&self.pool, tenant_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hash, test_store};

    fn registration(slug: &str, email: &str) -> NewRegistration {
        NewRegistration {
            hostel_name: format!("{} hostel", slug),
            subdomain: slug.to_string(),
            admin_email: email.to_string(),
            admin_name: "Owner".to_string(),
            password_hash: hash("secret"),
        }
    }

    #[tokio::test]
    async fn test_pending_request_reserves_slug() {
        let store = test_store().await;
        let first = store.create_registration(&registration("newhostel", "a@x.com")).await.unwrap();
        assert!(first.is_some());
        assert!(store.is_subdomain_taken("newhostel").await.unwrap());

        let second = store.create_registration(&registration("newhostel", "b@x.com")).await.unwrap();
        assert!(second.is_none());
        assert_eq!(store.list_registrations(Some(RegistrationStatus::Pending)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_tenant_slug_cannot_be_requested() {
        let store = test_store().await;
        store.create_tenant("Acme", "acme").await.unwrap();
        assert!(store.create_registration(&registration("acme", "a@x.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_store_one_row() {
        let store = test_store().await;
        let a = registration("race", "a@x.com");
        let b = registration("race", "b@x.com");
        let (ra, rb) = tokio::join!(store.create_registration(&a), store.create_registration(&b));

        let stored = [ra.unwrap(), rb.unwrap()].iter().filter(|r| r.is_some()).count();
        assert_eq!(stored, 1);
        assert_eq!(store.list_registrations(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approve_creates_tenant_and_admin() {
        let store = test_store().await;
        let root = crate::test_support::superadmin(&store, "root@x.com", "pw").await;
        let req = store.create_registration(&registration("sunrise", "owner@sunrise.com")).await.unwrap().unwrap();

        let approved = store.approve_registration(req.id, root.id).await.unwrap();
        assert_eq!(approved.registration.status, RegistrationStatus::Approved);
        assert_eq!(approved.registration.reviewed_by, Some(root.id));
        assert!(approved.registration.reviewed_at.is_some());
        assert_eq!(approved.tenant.subdomain, "sunrise");
        assert!(approved.tenant.is_active);
        assert_eq!(approved.admin.role, Role::Admin);
        assert_eq!(approved.admin.tenant_id, Some(approved.tenant.id));

        // Terminal: a second review is a conflict
        let err = store.approve_registration(req.id, root.id).await.unwrap_err();
        assert!(err.downcast_ref::<ConflictError>().is_some());
        let err = store.reject_registration(req.id, root.id, "late").await.unwrap_err();
        assert!(err.downcast_ref::<ConflictError>().is_some());
    }

    #[tokio::test]
    async fn test_approve_rolls_back_when_admin_email_taken() {
        let store = test_store().await;
        let root = crate::test_support::superadmin(&store, "root@x.com", "pw").await;
        let req = store.create_registration(&registration("clash", "root@x.com")).await.unwrap().unwrap();

        let err = store.approve_registration(req.id, root.id).await.unwrap_err();
        assert!(err.downcast_ref::<ConflictError>().is_some());
        assert!(store.get_tenant_by_subdomain("clash").await.unwrap().is_none());
        let still = store.get_registration(req.id).await.unwrap().unwrap();
        assert_eq!(still.status, RegistrationStatus::Pending);
    }

    #[tokio::test]
    async fn test_reject_frees_slug() {
        let store = test_store().await;
        let root = crate::test_support::superadmin(&store, "root@x.com", "pw").await;
        let req = store.create_registration(&registration("maybe", "a@x.com")).await.unwrap().unwrap();

        let rejected = store.reject_registration(req.id, root.id, "duplicate signup").await.unwrap();
        assert_eq!(rejected.status, RegistrationStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("duplicate signup"));
        assert!(store.get_tenant_by_subdomain("maybe").await.unwrap().is_none());
        assert!(!store.is_subdomain_taken("maybe").await.unwrap());
    }

    #[tokio::test]
    async fn test_rooms_and_students_are_tenant_scoped() {
        let store = test_store().await;
        let t1 = store.create_tenant("One", "one").await.unwrap();
        let t2 = store.create_tenant("Two", "two").await.unwrap();

        let room = store
            .create_room(t1.id, &CreateRoomRequest { number: "101".into(), floor: 1, capacity: 1 })
            .await
            .unwrap();

        // Guessing the id from another tenant finds nothing
        assert!(store.get_room(t2.id, room.id).await.unwrap().is_none());
        assert!(store.list_rooms(t2.id).await.unwrap().is_empty());
        let err = store.delete_room(t2.id, room.id).await.unwrap_err();
        assert!(err.downcast_ref::<NotFoundError>().is_some());
        let err = store
            .update_room(t2.id, room.id, &CreateRoomRequest { number: "X".into(), floor: 0, capacity: 9 })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<NotFoundError>().is_some());

        // Cross-tenant room assignment is refused
        let err = store
            .create_student(t2.id, &CreateStudentRequest { name: "Eve".into(), email: None, room_id: Some(room.id) })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<NotFoundError>().is_some());

        let s = store
            .create_student(t1.id, &CreateStudentRequest { name: "Ann".into(), email: None, room_id: Some(room.id) })
            .await
            .unwrap();
        assert!(store.get_student(t2.id, s.id).await.unwrap().is_none());
        assert_eq!(store.get_room(t1.id, room.id).await.unwrap().unwrap().occupied, 1);

        // Capacity 1 is now full
        let err = store
            .create_student(t1.id, &CreateStudentRequest { name: "Bob".into(), email: None, room_id: Some(room.id) })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ConflictError>().is_some());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = test_store().await;
        let cfg = crate::test_support::test_config();
        let demo = store.seed(&cfg).await.unwrap().unwrap();
        let again = store.seed(&cfg).await.unwrap().unwrap();

        assert_eq!(demo.id, again.id);
        assert_eq!(store.list_superadmins().await.unwrap().len(), 1);
        assert_eq!(store.list_tenant_users(demo.id).await.unwrap().len(), 1);
    }
}
