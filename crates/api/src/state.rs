use drivegate_config::Settings;
use drivegate_services::{
    AuthService, RecentFileRing, TokenResolver,
    dao::{api_binding::ApiBindingDao, recent_file::RecentFileDao, user::UserDao},
    dooray::{DoorayClient, DriveWalker, FileTransfer},
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub resolver: TokenResolver,
    pub walker: Arc<DriveWalker>,
    pub transfer: Arc<FileTransfer>,
    pub recent: Arc<RecentFileRing>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Result<Self, reqwest::Error> {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let resolver = TokenResolver::new(
            Arc::new(UserDao::new(&db)),
            Arc::new(ApiBindingDao::new(&db)),
        );

        // One connection pool shared by the walker and transfers.
        let client = DoorayClient::new(&settings.dooray)?;
        let walker = Arc::new(DriveWalker::new(client.clone(), &settings.dooray));
        let transfer = Arc::new(FileTransfer::new(client));

        let recent = Arc::new(RecentFileRing::new(
            Arc::new(RecentFileDao::new(&db)),
            settings.recent.capacity,
        ));

        Ok(Self {
            settings,
            auth,
            resolver,
            walker,
            transfer,
            recent,
        })
    }
}
