//! Process-wide container holding exactly one [`SessionStore`] per realm.

use std::sync::Arc;

use campusgate_core::{KeyValueStore, Realm};

use crate::gateway::RealmGateway;
use crate::navigator::HardNavigator;
use crate::offline::OfflineGateway;
use crate::session::SessionStore;

/// All realm sessions of one browsing context.
///
/// Lifecycle: build, then [`SessionRegistry::init_from_storage`] once at
/// startup. Each realm's store is then the source of truth for that realm.
#[derive(Debug)]
pub struct SessionRegistry {
    stores: [Arc<SessionStore>; 4],
}

impl SessionRegistry {
    pub fn builder(
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn HardNavigator>,
    ) -> SessionRegistryBuilder {
        SessionRegistryBuilder::new(storage, navigator)
    }

    pub fn store(&self, realm: Realm) -> &Arc<SessionStore> {
        &self.stores[realm.index()]
    }

    /// Hydrate every realm from persistent storage.
    pub fn init_from_storage(&self) {
        for store in &self.stores {
            store.init_from_storage();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SessionStore>> {
        self.stores.iter()
    }
}

/// Wires each realm to its collaborators. Realms without an explicit
/// gateway get an [`OfflineGateway`].
pub struct SessionRegistryBuilder {
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn HardNavigator>,
    gateways: [Option<Arc<dyn RealmGateway>>; 4],
}

impl SessionRegistryBuilder {
    pub fn new(storage: Arc<dyn KeyValueStore>, navigator: Arc<dyn HardNavigator>) -> Self {
        Self {
            storage,
            navigator,
            gateways: [None, None, None, None],
        }
    }

    pub fn gateway(mut self, realm: Realm, gateway: Arc<dyn RealmGateway>) -> Self {
        self.gateways[realm.index()] = Some(gateway);
        self
    }

    pub fn build(self) -> SessionRegistry {
        let Self {
            storage,
            navigator,
            mut gateways,
        } = self;

        let stores = Realm::ALL.map(|realm| {
            let gateway = gateways[realm.index()]
                .take()
                .unwrap_or_else(|| Arc::new(OfflineGateway::new(realm)));
            Arc::new(SessionStore::new(
                realm,
                gateway,
                storage.clone(),
                navigator.clone(),
            ))
        });

        SessionRegistry { stores }
    }
}
