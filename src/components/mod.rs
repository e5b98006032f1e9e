// Export components
pub mod api;
pub mod event_cache;
pub mod redis_service;
pub mod session;
pub mod storage;
pub mod ui;

pub use api::ApiClient;
pub use event_cache::{EventCache, EventRecord, EventRecordBuilder};
pub use session::{LoggingNavigator, Navigator, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use ui::UiHelper;
