use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{order, payment_transaction, user};
use crate::errors::ServiceError;
use crate::gateway::{CheckoutGateway, CreateSessionRequest};
use crate::models::cart::{CartItem, CartItems, ShippingAddress};
use crate::models::status::{CheckoutStatus, PaymentStatus};

const METADATA_SOURCE: &str = "7777_store";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub discount_code: Option<String>,
    /// Frontend origin the success/cancel pages live under.
    pub origin_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateCheckoutResponse {
    pub url: String,
    pub session_id: String,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutStatusResponse {
    pub status: CheckoutStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Hosted-checkout orchestration: session creation, status reconciliation
/// and webhook handling.
///
/// Orders and payment transactions are written independently and joined by
/// session id; the gateway stays the source of truth and reconciliation
/// overwrites local state last-writer-wins.
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    gateway: Option<Arc<dyn CheckoutGateway>>,
    currency: String,
    tax_rate: Decimal,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Option<Arc<dyn CheckoutGateway>>,
        currency: String,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            db,
            gateway,
            currency,
            tax_rate,
        }
    }

    fn gateway(&self) -> Result<&Arc<dyn CheckoutGateway>, ServiceError> {
        self.gateway.as_ref().ok_or_else(|| {
            ServiceError::Configuration("Payment gateway is not configured".to_string())
        })
    }

    /// Creates a hosted session and persists the order and transaction
    /// records keyed by the returned session id.
    #[instrument(skip(self, request, user), fields(items = request.items.len()))]
    pub async fn create_session(
        &self,
        request: CreateCheckoutRequest,
        user: Option<&user::Model>,
    ) -> Result<CreateCheckoutResponse, ServiceError> {
        let gateway = self.gateway()?;

        let items = CartItems(request.items);
        let subtotal = items.subtotal();
        let tax = subtotal * self.tax_rate;
        let shipping_cost = Decimal::ZERO;
        let total = subtotal + tax + shipping_cost;

        let origin = request.origin_url.trim_end_matches('/');
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), METADATA_SOURCE.to_string());
        metadata.insert("items_count".to_string(), items.len().to_string());
        if let Some(user) = user {
            metadata.insert("user_id".to_string(), user.id.to_string());
        }

        let session = gateway
            .create_session(CreateSessionRequest {
                amount: subtotal,
                currency: self.currency.clone(),
                // {CHECKOUT_SESSION_ID} is substituted by the gateway, not us
                success_url: format!(
                    "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
                    origin
                ),
                cancel_url: format!("{}/checkout/cancel", origin),
                metadata,
            })
            .await?;

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user.map(|u| u.id)),
            session_id: Set(session.session_id.clone()),
            items: Set(items.clone()),
            shipping_address: Set(request.shipping_address),
            discount_code: Set(request.discount_code),
            subtotal: Set(subtotal),
            tax: Set(tax),
            shipping_cost: Set(shipping_cost),
            total: Set(total),
            currency: Set(self.currency.clone()),
            status: Set(CheckoutStatus::Pending.to_string()),
            payment_status: Set(PaymentStatus::Initiated.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        order.insert(self.db.as_ref()).await?;

        let transaction = payment_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session.session_id.clone()),
            user_id: Set(user.map(|u| u.id)),
            amount: Set(subtotal),
            currency: Set(self.currency.clone()),
            items: Set(items),
            status: Set(CheckoutStatus::Pending.to_string()),
            payment_status: Set(PaymentStatus::Initiated.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        transaction.insert(self.db.as_ref()).await?;

        info!(
            order_id = %order_id,
            session_id = %session.session_id,
            %subtotal,
            "Created checkout session"
        );

        Ok(CreateCheckoutResponse {
            url: session.url,
            session_id: session.session_id,
            order_id,
        })
    }

    /// Queries the gateway and overwrites local state with whatever it
    /// reports. Unknown session ids update nothing and still return the
    /// gateway's answer.
    #[instrument(skip(self))]
    pub async fn poll_status(
        &self,
        session_id: &str,
    ) -> Result<CheckoutStatusResponse, ServiceError> {
        let gateway = self.gateway()?;
        let status = gateway.session_status(session_id).await?;

        self.reconcile(session_id, &status.status, &status.payment_status)
            .await?;

        Ok(CheckoutStatusResponse {
            status: CheckoutStatus::from(status.status.as_str()),
            payment_status: PaymentStatus::from(status.payment_status.as_str()),
            amount_total: status.amount_total,
            currency: status.currency,
            metadata: status.metadata,
        })
    }

    /// Verifies and applies a gateway webhook. Only
    /// `checkout.session.completed` mutates state; every other event type is
    /// acknowledged and ignored.
    #[instrument(skip(self, payload, signature))]
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), ServiceError> {
        let gateway = self.gateway()?;
        let event = gateway.verify_webhook(payload, signature)?;

        if event.event_type != "checkout.session.completed" {
            info!(event_type = %event.event_type, "Ignoring webhook event");
            return Ok(());
        }

        let payment_status = event
            .payment_status
            .unwrap_or_else(|| PaymentStatus::Paid.to_string());
        info!(
            session_id = %event.session_id,
            %payment_status,
            "Checkout session completed"
        );

        self.reconcile(
            &event.session_id,
            CheckoutStatus::Completed.as_str(),
            &payment_status,
        )
        .await
    }

    /// Bulk-updates both records for a session. Zero matched rows is a
    /// silent no-op.
    async fn reconcile(
        &self,
        session_id: &str,
        status: &str,
        payment_status: &str,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();

        let orders = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(status))
            .col_expr(order::Column::PaymentStatus, Expr::value(payment_status))
            .col_expr(order::Column::UpdatedAt, Expr::value(now))
            .filter(order::Column::SessionId.eq(session_id))
            .exec(self.db.as_ref())
            .await?;

        payment_transaction::Entity::update_many()
            .col_expr(payment_transaction::Column::Status, Expr::value(status))
            .col_expr(
                payment_transaction::Column::PaymentStatus,
                Expr::value(payment_status),
            )
            .col_expr(payment_transaction::Column::UpdatedAt, Expr::value(now))
            .filter(payment_transaction::Column::SessionId.eq(session_id))
            .exec(self.db.as_ref())
            .await?;

        if orders.rows_affected == 0 {
            warn!(session_id, "No local order for reconciled session");
        }
        Ok(())
    }
}
