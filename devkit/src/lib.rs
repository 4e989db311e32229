/*!
# GEX DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant les tests de la console GEX avec:
- Backend HTTP/WebSocket simulé (routes du tableau de bord)
- Constructeurs de charges utiles conformes au backend
- Harness de test avec assertions sur les requêtes reçues
*/

pub mod backend_stub;
pub mod fixtures;
pub mod test_utils;

pub use backend_stub::{RecordedRequest, StubBackend, WsMode};
pub use test_utils::TestHarness;
