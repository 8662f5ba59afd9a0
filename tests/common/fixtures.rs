//! In-memory upstream fakes for end-to-end tests
//!
//! Tests run against a real gateway server but fake the two upstream
//! services (hub and portal) and the token verifier. Fakes hold their
//! data behind a mutex so tests can reshape the catalog or inject
//! failures mid-test through the `Arc` handles exposed by `TestServer`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use apihub_portal::auth::{TokenVerifier, VerificationError, VerifiedUser};
use apihub_portal::hub::{
    ApiHub, HubApi, HubDeployment, HubSpecContents, HubVersion, SpecRef, UpstreamError,
};
use apihub_portal::portal::PortalApi;

use super::constants::*;

// ============================================================================
// Hub Fake
// ============================================================================

#[derive(Default)]
struct HubData {
    apis: Vec<HubApi>,
    versions: HashMap<String, Vec<HubVersion>>,
    deployments: HashMap<String, HubDeployment>,
    specs: HashMap<String, Vec<SpecRef>>,
    spec_contents: HashMap<String, HubSpecContents>,
    failures: HashMap<String, UpstreamError>,
}

/// In-memory hub catalog.
///
/// Failures are injected per method name ("list_apis", "list_versions", ...);
/// "list_versions:{api_name}" scopes a failure to one API.
#[derive(Default)]
pub struct FakeApiHub {
    data: Mutex<HubData>,
}

impl FakeApiHub {
    /// Two published APIs: Weather with a fully enriched v1 (deployment and
    /// spec attached) and Payments with a bare v1.
    pub fn demo_catalog() -> Self {
        let hub = Self::default();
        hub.add_api(WEATHER_API, WEATHER_API_DISPLAY_NAME);
        hub.add_version(WEATHER_API, WEATHER_V1, &[WEATHER_V1_DEPLOYMENT]);
        hub.add_deployment(WEATHER_V1_DEPLOYMENT, "Weather production");
        hub.add_spec(WEATHER_V1, WEATHER_V1_SPEC, WEATHER_SPEC_CONTENTS);
        hub.add_api(PAYMENTS_API, PAYMENTS_API_DISPLAY_NAME);
        hub.add_version(PAYMENTS_API, PAYMENTS_V1, &[]);
        hub
    }

    pub fn add_api(&self, name: &str, display_name: &str) {
        self.data.lock().unwrap().apis.push(HubApi {
            name: name.to_string(),
            display_name: Some(display_name.to_string()),
            description: None,
            extra: Default::default(),
        });
    }

    pub fn add_version(&self, api_name: &str, version_name: &str, deployments: &[&str]) {
        self.data
            .lock()
            .unwrap()
            .versions
            .entry(api_name.to_string())
            .or_default()
            .push(HubVersion {
                name: version_name.to_string(),
                display_name: None,
                deployments: deployments.iter().map(|d| d.to_string()).collect(),
                extra: Default::default(),
            });
    }

    pub fn add_deployment(&self, name: &str, display_name: &str) {
        self.data.lock().unwrap().deployments.insert(
            name.to_string(),
            HubDeployment {
                name: name.to_string(),
                display_name: Some(display_name.to_string()),
                extra: Default::default(),
            },
        );
    }

    pub fn add_spec(&self, version_name: &str, spec_name: &str, contents: &str) {
        let mut data = self.data.lock().unwrap();
        data.specs
            .entry(version_name.to_string())
            .or_default()
            .push(SpecRef {
                name: spec_name.to_string(),
                display_name: None,
                extra: Default::default(),
            });
        data.spec_contents.insert(
            spec_name.to_string(),
            HubSpecContents {
                mime_type: Some("application/yaml".to_string()),
                contents: Some(contents.to_string()),
                extra: Default::default(),
            },
        );
    }

    pub fn set_failure(&self, method: &str, err: UpstreamError) {
        self.data
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), err);
    }

    pub fn clear_failure(&self, method: &str) {
        self.data.lock().unwrap().failures.remove(method);
    }

    fn check_failure(&self, method: &str) -> Result<(), UpstreamError> {
        match self.data.lock().unwrap().failures.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApiHub for FakeApiHub {
    async fn list_apis(&self, _filter: &str) -> Result<Vec<HubApi>, UpstreamError> {
        self.check_failure("list_apis")?;
        Ok(self.data.lock().unwrap().apis.clone())
    }

    async fn list_versions(&self, api_name: &str) -> Result<Vec<HubVersion>, UpstreamError> {
        self.check_failure("list_versions")?;
        self.check_failure(&format!("list_versions:{}", api_name))?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .versions
            .get(api_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_deployment(
        &self,
        deployment_ref: &str,
    ) -> Result<Option<HubDeployment>, UpstreamError> {
        self.check_failure("get_deployment")?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .deployments
            .get(deployment_ref)
            .cloned())
    }

    async fn list_version_specs(&self, version_name: &str) -> Result<Vec<SpecRef>, UpstreamError> {
        self.check_failure("list_version_specs")?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .specs
            .get(version_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_spec_contents(
        &self,
        spec_ref: &str,
    ) -> Result<Option<HubSpecContents>, UpstreamError> {
        self.check_failure("get_spec_contents")?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .spec_contents
            .get(spec_ref)
            .cloned())
    }
}

// ============================================================================
// Portal Fake
// ============================================================================

#[derive(Default)]
struct PortalData {
    /// Apps per developer email
    apps: HashMap<String, Vec<Value>>,
    failures: HashMap<String, UpstreamError>,
}

/// In-memory developer portal.
///
/// Same failure-injection scheme as `FakeApiHub`, keyed by the `PortalApi`
/// method name.
#[derive(Default)]
pub struct FakePortal {
    data: Mutex<PortalData>,
}

impl FakePortal {
    /// Portal with `TEST_EMAIL` registered and already owning `TEST_APP_NAME`.
    pub fn with_test_developer() -> Self {
        let portal = Self::default();
        portal.data.lock().unwrap().apps.insert(
            TEST_EMAIL.to_string(),
            vec![json!({ "name": TEST_APP_NAME, "status": "approved" })],
        );
        portal
    }

    pub fn set_failure(&self, method: &str, err: UpstreamError) {
        self.data
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), err);
    }

    pub fn clear_failure(&self, method: &str) {
        self.data.lock().unwrap().failures.remove(method);
    }

    /// Names of the apps a developer currently owns.
    pub fn app_names(&self, email: &str) -> Vec<String> {
        self.data
            .lock()
            .unwrap()
            .apps
            .get(email)
            .map(|apps| {
                apps.iter()
                    .filter_map(|app| app["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check_failure(&self, method: &str) -> Result<(), UpstreamError> {
        match self.data.lock().unwrap().failures.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PortalApi for FakePortal {
    async fn create_developer(&self, developer: &Value) -> Result<Value, UpstreamError> {
        self.check_failure("create_developer")?;
        if let Some(email) = developer.get("email").and_then(Value::as_str) {
            self.data
                .lock()
                .unwrap()
                .apps
                .entry(email.to_string())
                .or_default();
        }
        Ok(developer.clone())
    }

    async fn get_apps(&self, email: &str) -> Result<Value, UpstreamError> {
        self.check_failure("get_apps")?;
        match self.data.lock().unwrap().apps.get(email) {
            Some(apps) => Ok(json!({ "app": apps })),
            None => Err(UpstreamError::new(
                404,
                format!("developer {} not found", email),
            )),
        }
    }

    async fn create_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError> {
        self.check_failure("create_app")?;
        let mut data = self.data.lock().unwrap();
        let apps = data
            .apps
            .get_mut(email)
            .ok_or_else(|| UpstreamError::new(404, format!("developer {} not found", email)))?;
        if apps.iter().any(|app| app["name"] == app_name) {
            return Err(UpstreamError::new(
                409,
                format!("app {} already exists", app_name),
            ));
        }
        let app = json!({
            "name": app_name,
            "status": "approved",
            "credentials": [{ "consumerKey": "test-consumer-key" }],
        });
        apps.push(app.clone());
        Ok(app)
    }

    async fn delete_app(&self, email: &str, app_name: &str) -> Result<Value, UpstreamError> {
        self.check_failure("delete_app")?;
        let mut data = self.data.lock().unwrap();
        let apps = data
            .apps
            .get_mut(email)
            .ok_or_else(|| UpstreamError::new(404, format!("developer {} not found", email)))?;
        let before = apps.len();
        apps.retain(|app| app["name"] != app_name);
        if apps.len() == before {
            return Err(UpstreamError::new(
                404,
                format!("app {} not found", app_name),
            ));
        }
        Ok(json!({ "name": app_name, "status": "deleted" }))
    }

    async fn get_products(&self) -> Result<Value, UpstreamError> {
        self.check_failure("get_products")?;
        Ok(json!({
            "apiProduct": [
                { "name": "weather-basic", "displayName": "Weather Basic" },
                { "name": "payments-basic", "displayName": "Payments Basic" },
            ]
        }))
    }

    async fn add_app_key_products(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        products: &[String],
    ) -> Result<Value, UpstreamError> {
        self.check_failure("add_app_key_products")?;
        let _ = (email, app_name);
        Ok(json!({ "consumerKey": key_name, "apiProducts": products }))
    }

    async fn remove_app_key_product(
        &self,
        email: &str,
        app_name: &str,
        key_name: &str,
        product_name: &str,
    ) -> Result<Value, UpstreamError> {
        self.check_failure("remove_app_key_product")?;
        let _ = (email, app_name, product_name);
        Ok(json!({ "consumerKey": key_name, "apiProducts": [] }))
    }
}

// ============================================================================
// Verifier Fake
// ============================================================================

/// Token verifier that accepts the two fixed test tokens.
#[derive(Default)]
pub struct FakeVerifier;

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerificationError> {
        match token {
            VALID_TOKEN => Ok(VerifiedUser {
                subject: "test-uid-1".to_string(),
                email: Some(TEST_EMAIL.to_string()),
            }),
            NO_EMAIL_TOKEN => Ok(VerifiedUser {
                subject: "test-uid-2".to_string(),
                email: None,
            }),
            _ => Err(VerificationError::InvalidToken(
                "unrecognized test token".to_string(),
            )),
        }
    }
}
