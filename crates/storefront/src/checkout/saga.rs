//! The checkout saga state machine.

use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tracing::{debug, info, warn};

use tienda_core::{AddressId, BillId, ClientId, Email, OrderId, OrderLineId, OrderStatus};

use crate::cart::CartSnapshot;
use crate::error::{CheckoutError, ValidationIssues};
use crate::gateway::OrderGateway;
use crate::gateway::types::{NewAddress, NewBill, NewClient, NewOrder, NewOrderLine};
use crate::pricing;

use super::{CheckoutRequest, CustomerInfo, OrderConfirmation, SagaStep};

/// Remote resources created so far by one submission attempt.
///
/// Handed to the [`Compensator`] when the attempt fails, so a future
/// rollback strategy has everything it needs without restructuring the
/// saga.
#[derive(Debug, Clone, Default)]
pub struct SagaProgress {
    pub client_id: Option<ClientId>,
    pub address_id: Option<AddressId>,
    pub bill_id: Option<BillId>,
    pub order_id: Option<OrderId>,
    pub order_line_ids: Vec<OrderLineId>,
}

/// Extension point for compensating a failed submission.
///
/// The backend offers no transactional rollback, and none is performed
/// today: [`NoCompensation`] accepts the orphans (clients are reusable
/// across future attempts, and a partial order is flagged for manual
/// reconciliation instead). Implement this to delete or mark the
/// recorded resources once the backend grows the endpoints for it.
#[allow(async_fn_in_trait)]
pub trait Compensator {
    /// Called with the recorded progress after a failed attempt,
    /// before the failure is returned to the caller.
    async fn compensate(&self, progress: &SagaProgress);
}

/// The default compensator: leaves everything in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompensation;

impl Compensator for NoCompensation {
    async fn compensate(&self, _progress: &SagaProgress) {}
}

/// Clears the in-flight flag when an attempt finishes, including when
/// its future is dropped mid-flight by a caller-side timeout.
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Customer data that survived validation.
struct ValidatedCustomer {
    first_name: String,
    last_name: String,
    email: Email,
    phone: String,
    address: Option<String>,
}

/// Drives one cart-to-order submission to a terminal outcome.
///
/// Steps 1-5 (validate, client, address, bill, order) are strictly
/// sequential: a step only begins once the prior step's identifier is
/// available. Order lines are the only intentional concurrency: all
/// line requests go out together and every outcome is collected. Any
/// failed line at that point is a partial order, because the order
/// record already exists remotely.
///
/// A failed step is terminal for that attempt; nothing is retried and
/// nothing is rolled back. A fresh `run` restarts from validation and
/// creates a new client/bill/order chain - duplicate remote rows are an
/// accepted consequence of the missing backend transaction.
pub struct CheckoutSaga<G, C = NoCompensation> {
    gateway: G,
    compensator: C,
    in_flight: AtomicBool,
}

impl<G: OrderGateway> CheckoutSaga<G> {
    /// Create a saga over `gateway` with no compensation.
    #[must_use]
    pub const fn new(gateway: G) -> Self {
        Self {
            gateway,
            compensator: NoCompensation,
            in_flight: AtomicBool::new(false),
        }
    }
}

impl<G: OrderGateway, C: Compensator> CheckoutSaga<G, C> {
    /// Create a saga that hands failed-attempt progress to
    /// `compensator`.
    #[must_use]
    pub const fn with_compensator(gateway: G, compensator: C) -> Self {
        Self {
            gateway,
            compensator,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one submission attempt to completion or terminal failure.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] if another attempt is
    ///   already running on this saga instance.
    /// - [`CheckoutError::Validation`] before any network call when the
    ///   cart is empty or required fields are missing.
    /// - [`CheckoutError::Step`] when a creation step fails; earlier
    ///   steps' resources remain remotely.
    /// - [`CheckoutError::PartialOrder`] when the order exists but one
    ///   or more of its lines failed.
    pub async fn run(
        &self,
        snapshot: &CartSnapshot,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(CheckoutError::SubmissionInFlight);
        }
        let _reset = InFlightReset(&self.in_flight);

        self.execute(snapshot, request).await
    }

    async fn execute(
        &self,
        snapshot: &CartSnapshot,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let customer = validate(snapshot, request)?;

        let mut progress = SagaProgress::default();
        let outcome = self
            .create_resources(snapshot, request, &customer, &mut progress)
            .await;

        if outcome.is_err() {
            self.compensator.compensate(&progress).await;
        }
        outcome
    }

    async fn create_resources(
        &self,
        snapshot: &CartSnapshot,
        request: &CheckoutRequest,
        customer: &ValidatedCustomer,
        progress: &mut SagaProgress,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let total = pricing::compute_totals(snapshot, request.delivery_method).total;

        let client_id = self
            .gateway
            .create_client(&NewClient {
                name: customer.first_name.clone(),
                lastname: customer.last_name.clone(),
                email: customer.email.clone(),
                telephone: customer.phone.clone(),
            })
            .await
            .map_err(|source| CheckoutError::Step {
                step: SagaStep::CreatingClient,
                source,
            })?;
        progress.client_id = Some(client_id);
        debug!(%client_id, "client created");

        if request.delivery_method.requires_address() {
            // Validation guarantees the address is present here.
            let description = customer.address.clone().unwrap_or_default();
            let address_id = self
                .gateway
                .create_address(&NewAddress {
                    description,
                    client_id,
                })
                .await
                .map_err(|source| CheckoutError::Step {
                    step: SagaStep::CreatingAddress,
                    source,
                })?;
            progress.address_id = Some(address_id);
            debug!(%address_id, "address created");
        }

        let bill_id = self
            .gateway
            .create_bill(&NewBill { total, client_id })
            .await
            .map_err(|source| CheckoutError::Step {
                step: SagaStep::CreatingBill,
                source,
            })?;
        progress.bill_id = Some(bill_id);
        debug!(%bill_id, "bill created");

        let order_id = self
            .gateway
            .create_order(&NewOrder {
                client_id,
                bill_id,
                delivery_method: request.delivery_method,
                status: OrderStatus::Pending,
            })
            .await
            .map_err(|source| CheckoutError::Step {
                step: SagaStep::CreatingOrder,
                source,
            })?;
        progress.order_id = Some(order_id);
        debug!(%order_id, "order created");

        self.create_order_lines(order_id, snapshot, progress)
            .await?;

        info!(
            %order_id,
            %total,
            payment = ?request.payment_method,
            "order placed"
        );
        Ok(OrderConfirmation { order_id, total })
    }

    /// Fan out one request per cart line and collect every outcome
    /// before deciding.
    async fn create_order_lines(
        &self,
        order_id: OrderId,
        snapshot: &CartSnapshot,
        progress: &mut SagaProgress,
    ) -> Result<(), CheckoutError> {
        let requests: Vec<NewOrderLine> = snapshot
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();

        let outcomes = join_all(
            requests
                .iter()
                .map(|line| self.gateway.create_order_line(line)),
        )
        .await;

        let attempted = outcomes.len();
        let mut failed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(line_id) => progress.order_line_ids.push(line_id),
                Err(source) => {
                    warn!(%order_id, error = %source, "order line creation failed");
                    failed += 1;
                }
            }
        }

        if failed == 0 {
            return Ok(());
        }

        // The order record already exists, so even an all-lines-failed
        // run is a partial order that needs manual reconciliation.
        warn!(
            %order_id,
            failed,
            attempted,
            "order created with missing line items; needs manual reconciliation"
        );
        Err(CheckoutError::PartialOrder {
            order_id,
            failed,
            attempted,
        })
    }
}

/// Check the cart and customer fields, listing everything wrong at
/// once. Never contacts the remote boundary.
fn validate(
    snapshot: &CartSnapshot,
    request: &CheckoutRequest,
) -> Result<ValidatedCustomer, CheckoutError> {
    let CustomerInfo {
        full_name,
        email,
        phone,
        shipping_address,
    } = &request.customer;

    let mut issues = ValidationIssues {
        empty_cart: snapshot.is_empty(),
        ..ValidationIssues::default()
    };

    let full_name = full_name.trim();
    if full_name.is_empty() {
        issues.missing_fields.push("client_name");
    }

    let email = match Email::parse(email.trim()) {
        Ok(email) => Some(email),
        Err(_) => {
            issues.missing_fields.push("client_email");
            None
        }
    };

    let phone = phone.trim();
    if phone.is_empty() {
        issues.missing_fields.push("client_phone");
    }

    let address = shipping_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    if request.delivery_method.requires_address() && address.is_none() {
        issues.missing_fields.push("shipping_address");
    }

    if !issues.is_clean() {
        return Err(CheckoutError::Validation(issues));
    }

    let (first_name, last_name) = split_name(full_name);
    // `email` is Some whenever issues is clean.
    let email = email.ok_or_else(|| CheckoutError::Validation(ValidationIssues::default()))?;

    Ok(ValidatedCustomer {
        first_name,
        last_name,
        email,
        phone: phone.to_owned(),
        address: address.map(str::to_owned),
    })
}

/// Split a full name into first name and the remainder at submission
/// time. A single-token name gets an empty last name.
fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_owned();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
