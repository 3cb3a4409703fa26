use crate::{
    commands::definitions::{Invocation, SLASH_COMMANDS},
    database::JsonStore,
    platform::{Caller, Platform, Reply, ReplyTarget},
    services::registry_service::{self, RemoveOutcome},
    utils::AppError,
};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const LIST_TITLE: &str = "📜 ID List";

/// Command handlers. Every reply goes out through the injected platform.
///
/// The store sits behind a mutex: the Discord client dispatches events
/// concurrently and each command is a full load-modify-save sequence.
pub struct CommandHandlers<P: Platform> {
    store: Mutex<JsonStore>,
    platform: Arc<P>,
    scope: u64,
}

impl<P: Platform> CommandHandlers<P> {
    pub fn new(store: JsonStore, platform: Arc<P>, scope: u64) -> Self {
        Self {
            store: Mutex::new(store),
            platform,
            scope,
        }
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    pub async fn dispatch(
        &self,
        invocation: Invocation,
        caller: &Caller,
        target: &ReplyTarget,
    ) -> Result<(), AppError> {
        match invocation {
            Invocation::AddId { identifier } => self.add(caller, &identifier, target).await,
            Invocation::ListIds => self.list(target).await,
            Invocation::RemoveId => self.remove(caller, target).await,
            Invocation::Debug => self.debug_list_registered(target).await,
        }
    }

    pub async fn add(
        &self,
        caller: &Caller,
        identifier: &str,
        target: &ReplyTarget,
    ) -> Result<(), AppError> {
        log::info!("📝 add_id from {} ({})", caller.display_name, caller.user_id);

        if identifier.is_empty() {
            return self
                .platform
                .send_response(target, Reply::private("❌ Your ID cannot be empty."))
                .await;
        }

        let record = {
            let store = self.store.lock().await;
            registry_service::add_entry(&store, &caller.user_id, &caller.display_name, identifier)?
        };

        let text = format!("✅ Your ID has been saved: `{}`", record.external_id);
        self.platform.send_response(target, Reply::private(text)).await
    }

    pub async fn list(&self, target: &ReplyTarget) -> Result<(), AppError> {
        let records = {
            let store = self.store.lock().await;
            registry_service::list_entries(&store)?
        };

        log::info!("📋 list_ids - {} entries", records.len());

        let reply = if records.is_empty() {
            Reply::public("📭 No IDs have been registered yet.")
        } else {
            let entries = records
                .into_iter()
                .map(|r| (r.display_name, r.external_id))
                .collect();
            Reply::listing(LIST_TITLE, entries)
        };

        self.platform.send_response(target, reply).await
    }

    pub async fn remove(&self, caller: &Caller, target: &ReplyTarget) -> Result<(), AppError> {
        log::info!("🗑️  remove_id from {} ({})", caller.display_name, caller.user_id);

        let outcome = {
            let store = self.store.lock().await;
            registry_service::remove_entry(&store, &caller.user_id)?
        };

        let reply = match outcome {
            RemoveOutcome::Removed(_) => Reply::private("🗑️ Your ID has been removed."),
            RemoveOutcome::NotFound => Reply::private("❌ You had no ID saved."),
        };

        self.platform.send_response(target, reply).await
    }

    pub async fn debug_list_registered(&self, target: &ReplyTarget) -> Result<(), AppError> {
        let names = self.platform.fetch_registered_commands(self.scope).await?;

        log::info!("🔍 debug - {} registered commands in scope {}", names.len(), self.scope);

        let text = if names.is_empty() {
            "⚠️ No slash commands found on the platform.".to_string()
        } else {
            let lines: Vec<String> = names.iter().map(|n| format!("- {}", n)).collect();
            format!("📜 Registered commands:\n{}", lines.join("\n"))
        };

        self.platform.send_response(target, Reply::public(text)).await
    }

    /// Best-effort: a failed sync is logged and the bot keeps running.
    pub async fn register_command_set(&self) {
        match self.platform.register_commands(&SLASH_COMMANDS).await {
            Ok(count) => log::info!("✅ {} slash commands synchronized", count),
            Err(e) => log::warn!("⚠️  Failed to synchronize slash commands: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{CommandSpec, ReplyBody, Visibility};
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingPlatform {
        sent: std::sync::Mutex<Vec<(ReplyTarget, Reply)>>,
        registered: std::sync::Mutex<Vec<String>>,
        fail_registration: bool,
    }

    impl RecordingPlatform {
        fn last(&self) -> Reply {
            self.sent.lock().unwrap().last().unwrap().1.clone()
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Platform for RecordingPlatform {
        async fn send_response(&self, target: &ReplyTarget, reply: Reply) -> Result<(), AppError> {
            self.sent.lock().unwrap().push((target.clone(), reply));
            Ok(())
        }

        async fn register_commands(&self, commands: &[CommandSpec]) -> Result<usize, AppError> {
            if self.fail_registration {
                return Err(AppError::Platform("missing access".to_string()));
            }
            let mut registered = self.registered.lock().unwrap();
            registered.clear();
            registered.extend(commands.iter().map(|c| c.name.to_string()));
            Ok(commands.len())
        }

        async fn fetch_registered_commands(&self, _scope: u64) -> Result<Vec<String>, AppError> {
            Ok(self.registered.lock().unwrap().clone())
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        platform: Arc<RecordingPlatform>,
        handlers: CommandHandlers<RecordingPlatform>,
    }

    fn fixture_with(platform: RecordingPlatform) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("data.json"));
        let platform = Arc::new(platform);
        let handlers = CommandHandlers::new(store, platform.clone(), 1234);
        Fixture { _dir: dir, platform, handlers }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingPlatform::default())
    }

    fn caller(id: &str, name: &str) -> Caller {
        Caller {
            user_id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn interaction() -> ReplyTarget {
        ReplyTarget::Interaction { id: 1, token: "token".to_string() }
    }

    #[tokio::test]
    async fn test_add_list_overwrite_remove_scenario() {
        let f = fixture();
        let alice = caller("u1", "Alice");
        let target = interaction();

        f.handlers.add(&alice, "ALC#1234", &target).await.unwrap();
        let confirmation = f.platform.last();
        assert_eq!(confirmation.visibility, Visibility::Private);
        assert!(confirmation.render_text().contains("ALC#1234"));

        f.handlers.list(&target).await.unwrap();
        let listing = f.platform.last();
        assert_eq!(listing.visibility, Visibility::Public);
        assert!(listing.render_text().contains("Alice: ALC#1234"));

        f.handlers.add(&alice, "ALC#9999", &target).await.unwrap();
        f.handlers.list(&target).await.unwrap();
        assert_eq!(
            f.platform.last().body,
            ReplyBody::Listing {
                title: LIST_TITLE.to_string(),
                entries: vec![("Alice".to_string(), "ALC#9999".to_string())],
            }
        );

        f.handlers.remove(&alice, &target).await.unwrap();
        assert_eq!(f.platform.last(), Reply::private("🗑️ Your ID has been removed."));

        f.handlers.list(&target).await.unwrap();
        assert_eq!(f.platform.last(), Reply::public("📭 No IDs have been registered yet."));
    }

    #[tokio::test]
    async fn test_list_has_one_entry_per_user() {
        let f = fixture();
        let target = interaction();

        f.handlers.add(&caller("u1", "Alice"), "A1", &target).await.unwrap();
        f.handlers.add(&caller("u2", "Bob"), "B1", &target).await.unwrap();
        f.handlers.add(&caller("u1", "Alice"), "A2", &target).await.unwrap();
        f.handlers.list(&target).await.unwrap();

        let text = f.platform.last().render_text();
        assert_eq!(text, format!("{}\nAlice: A2\nBob: B1", LIST_TITLE));
    }

    #[tokio::test]
    async fn test_remove_without_entry_is_informational() {
        let f = fixture();
        let target = interaction();
        f.handlers.add(&caller("u2", "Bob"), "B1", &target).await.unwrap();

        f.handlers.remove(&caller("u1", "Alice"), &target).await.unwrap();

        assert_eq!(f.platform.last(), Reply::private("❌ You had no ID saved."));
        f.handlers.list(&target).await.unwrap();
        assert_eq!(f.platform.last().render_text(), format!("{}\nBob: B1", LIST_TITLE));
    }

    #[tokio::test]
    async fn test_add_rejects_empty_identifier() {
        let f = fixture();

        f.handlers.add(&caller("u1", "Alice"), "", &interaction()).await.unwrap();

        assert_eq!(f.platform.last(), Reply::private("❌ Your ID cannot be empty."));
        f.handlers.list(&interaction()).await.unwrap();
        assert_eq!(f.platform.last(), Reply::public("📭 No IDs have been registered yet."));
    }

    #[tokio::test]
    async fn test_add_stores_whitespace_identifier_verbatim() {
        let f = fixture();

        f.handlers.add(&caller("u1", "Alice"), "   ", &interaction()).await.unwrap();

        assert_eq!(f.platform.last(), Reply::private("✅ Your ID has been saved: `   `"));
        f.handlers.list(&interaction()).await.unwrap();
        assert_eq!(f.platform.last().render_text(), format!("{}\nAlice:    ", LIST_TITLE));
    }

    #[tokio::test]
    async fn test_debug_reports_registered_commands() {
        let f = fixture();
        let target = ReplyTarget::Channel { id: 99 };

        f.handlers.debug_list_registered(&target).await.unwrap();
        assert_eq!(
            f.platform.last(),
            Reply::public("⚠️ No slash commands found on the platform.")
        );

        f.handlers.register_command_set().await;
        f.handlers.debug_list_registered(&target).await.unwrap();
        assert_eq!(
            f.platform.last(),
            Reply::public("📜 Registered commands:\n- add_id\n- list_ids\n- remove_id")
        );
        assert_eq!(f.platform.sent.lock().unwrap().last().unwrap().0, target);
    }

    #[tokio::test]
    async fn test_registration_failure_is_not_fatal() {
        let f = fixture_with(RecordingPlatform {
            fail_registration: true,
            ..Default::default()
        });

        f.handlers.register_command_set().await;

        assert_eq!(f.platform.sent_count(), 0);
        f.handlers
            .dispatch(Invocation::ListIds, &caller("u1", "Alice"), &interaction())
            .await
            .unwrap();
        assert_eq!(f.platform.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_routes_invocations() {
        let f = fixture();
        let alice = caller("u1", "Alice");
        let target = interaction();

        f.handlers
            .dispatch(Invocation::AddId { identifier: "ALC#1".to_string() }, &alice, &target)
            .await
            .unwrap();
        f.handlers.dispatch(Invocation::RemoveId, &alice, &target).await.unwrap();

        assert_eq!(f.platform.last(), Reply::private("🗑️ Your ID has been removed."));
        assert_eq!(f.platform.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_store_propagates_without_reply() {
        let f = fixture();
        {
            let store = f.handlers.store.lock().await;
            std::fs::write(store.path(), "{{{").unwrap();
        }

        let result = f.handlers.list(&interaction()).await;

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(f.platform.sent_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_not_lost() {
        let f = fixture();
        let handlers = Arc::new(f.handlers);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let handlers = handlers.clone();
                tokio::spawn(async move {
                    let who = caller(&format!("u{}", i), &format!("User{}", i));
                    handlers.add(&who, &format!("ID#{}", i), &interaction()).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let store = handlers.store.lock().await;
        assert_eq!(store.load().unwrap().len(), 16);
    }
}
