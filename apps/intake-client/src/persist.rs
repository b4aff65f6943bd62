//! # Session Snapshots
//!
//! Lets a half-finished order survive an app restart. The snapshot is a
//! single JSON file holding the cart, the active coupon, the BMI form and
//! the delivery postcode.
//!
//! ```json
//! {
//!   "sessionId": "6f1c…",
//!   "savedAt": "2026-01-12T09:30:00Z",
//!   "product": "mounjaro",
//!   "cart": { "doses": [...], "addons": [...], "totalAmount": 12000, ... },
//!   "coupon": { "code": "TEN", "discount": { "type": "percent", "value": 1000 } },
//!   "bmi": { "heightUnit": "metric", "heightCm": 170.0, ... },
//!   "postcode": "SW1A 1AA"
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use intake_core::{BmiMeasurement, Cart, Coupon};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::state::{BmiState, CartState, CouponState, Session};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub product: Option<String>,
    pub cart: Cart,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub bmi: BmiMeasurement,
    #[serde(default)]
    pub postcode: Option<String>,
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        SessionSnapshot {
            session_id: session.id(),
            saved_at: Utc::now(),
            product: session.product().map(str::to_string),
            cart: session.cart_snapshot(),
            coupon: session.coupon().active(),
            bmi: session.bmi().measurement(),
            postcode: session.postcode().map(str::to_string),
        }
    }

    /// Writes the snapshot, replacing any previous one.
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;

        debug!(?path, session_id = %self.session_id, "Session snapshot saved");
        Ok(())
    }

    /// Reads a snapshot. A missing file is `Ok(None)`.
    ///
    /// ## Errors
    /// [`ClientError::CorruptSnapshot`] when the stored cart totals do not
    /// match its lines.
    pub fn load(path: &Path) -> ClientResult<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: SessionSnapshot = serde_json::from_slice(&bytes)?;
        if !snapshot.cart.is_consistent() {
            return Err(ClientError::CorruptSnapshot(
                "cart total does not match its lines".into(),
            ));
        }

        info!(?path, session_id = %snapshot.session_id, "Session snapshot loaded");
        Ok(Some(snapshot))
    }

    /// Deletes the snapshot file if there is one.
    pub fn discard(path: &Path) -> ClientResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Rebuilds a live session. Shipping comes from `config`, not the file.
    pub fn into_session(self, config: &ClientConfig) -> Session {
        let mut session = Session::with_stores(
            self.session_id,
            config.shipping(),
            CartState::from_cart(self.cart),
            CouponState::from_coupon(self.coupon),
            BmiState::from_measurement(self.bmi),
        );
        if let Some(product) = self.product {
            session.switch_product(product);
        }
        if let Some(postcode) = self.postcode {
            if let Err(err) = session.set_postcode(&postcode) {
                warn!(%postcode, error = %err.message, "Dropping stored postcode");
            }
        }
        session
    }
}
