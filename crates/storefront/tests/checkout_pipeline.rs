//! End-to-end checkout pipeline tests over an in-memory cart and a
//! scripted gateway.
//!
//! These cover the saga's ordering and failure semantics: which remote
//! calls go out, in what order, and what happens to the cart for each
//! terminal outcome.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use rust_decimal::Decimal;

use tienda_core::{
    AddressId, BillId, ClientId, DeliveryMethod, OrderId, OrderLineId, PaymentMethod, ProductId,
};
use tienda_storefront::cart::{CartLine, CartSnapshot, CartStore, MemoryStorage, ProductRef};
use tienda_storefront::checkout::{
    CheckoutOutcome, CheckoutRequest, CheckoutSaga, CustomerInfo, report,
};
use tienda_storefront::error::CheckoutError;
use tienda_storefront::gateway::types::{
    NewAddress, NewBill, NewClient, NewOrder, NewOrderLine,
};
use tienda_storefront::gateway::{GatewayError, OrderGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Client,
    Address,
    Bill,
    Order,
    OrderLine(i32),
}

/// Scripted gateway that records every call and fails on demand.
#[derive(Default)]
struct MockGateway {
    calls: Mutex<Vec<Call>>,
    bill_total: Mutex<Option<Decimal>>,
    fail_bill: bool,
    /// Product ids whose order-line creation fails with a 500.
    failing_products: Vec<i32>,
    /// Delay client creation to hold a submission in flight.
    client_delay: Option<Duration>,
}

impl MockGateway {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn server_error(message: &str) -> GatewayError {
        GatewayError::Server {
            status: 500,
            message: message.to_string(),
        }
    }
}

impl OrderGateway for MockGateway {
    async fn create_client(&self, _client: &NewClient) -> Result<ClientId, GatewayError> {
        if let Some(delay) = self.client_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::Client);
        Ok(ClientId::new(7))
    }

    async fn create_address(&self, address: &NewAddress) -> Result<AddressId, GatewayError> {
        assert_eq!(address.client_id, ClientId::new(7));
        self.record(Call::Address);
        Ok(AddressId::new(3))
    }

    async fn create_bill(&self, bill: &NewBill) -> Result<BillId, GatewayError> {
        self.record(Call::Bill);
        if self.fail_bill {
            return Err(Self::server_error("bill service unavailable"));
        }
        *self.bill_total.lock().unwrap() = Some(bill.total);
        Ok(BillId::new(9))
    }

    async fn create_order(&self, order: &NewOrder) -> Result<OrderId, GatewayError> {
        // The order must reference the identifiers captured earlier.
        assert_eq!(order.client_id, ClientId::new(7));
        assert_eq!(order.bill_id, BillId::new(9));
        self.record(Call::Order);
        Ok(OrderId::new(42))
    }

    async fn create_order_line(&self, line: &NewOrderLine) -> Result<OrderLineId, GatewayError> {
        assert_eq!(line.order_id, OrderId::new(42));
        let product = line.product_id.as_i32();
        self.record(Call::OrderLine(product));
        if self.failing_products.contains(&product) {
            return Err(Self::server_error("line rejected"));
        }
        Ok(OrderLineId::new(100 + product))
    }
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        full_name: "Juan Pérez".to_string(),
        email: "juan@example.com".to_string(),
        phone: "2612077095".to_string(),
        shipping_address: Some("Calle Falsa 123".to_string()),
    }
}

fn request(delivery_method: DeliveryMethod) -> CheckoutRequest {
    CheckoutRequest {
        customer: customer(),
        delivery_method,
        payment_method: PaymentMethod::Card,
    }
}

fn line(product: i32, price: i64, quantity: u32) -> CartLine {
    CartLine {
        product_id: ProductId::new(product),
        name: format!("product {product}"),
        unit_price: Decimal::new(price, 0),
        quantity,
    }
}

fn filled_cart() -> CartStore<MemoryStorage> {
    let mut cart = CartStore::new(MemoryStorage::new());
    cart.add(
        ProductRef {
            id: ProductId::new(1),
            name: "product 1".to_string(),
            unit_price: Decimal::new(100, 0),
        },
        2,
    )
    .unwrap();
    cart
}

#[tokio::test]
async fn test_home_delivery_runs_all_steps_in_order() {
    let saga = CheckoutSaga::new(MockGateway::default());
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);

    let confirmation = saga
        .run(&snapshot, &request(DeliveryMethod::HomeDelivery))
        .await
        .unwrap();

    assert_eq!(confirmation.order_id, OrderId::new(42));
    // subtotal 200 + tax 32 + flat fee 50
    assert_eq!(confirmation.total, Decimal::new(282, 0));
}

#[tokio::test]
async fn test_call_order_is_client_address_bill_order_lines() {
    let gateway = MockGateway::default();
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    {
        let saga = CheckoutSaga::new(&gateway);
        saga.run(&snapshot, &request(DeliveryMethod::HomeDelivery))
            .await
            .unwrap();
    }

    assert_eq!(
        gateway.calls(),
        vec![
            Call::Client,
            Call::Address,
            Call::Bill,
            Call::Order,
            Call::OrderLine(1)
        ]
    );
}

#[tokio::test]
async fn test_address_step_skipped_for_drive_thru() {
    let gateway = MockGateway::default();
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    {
        let saga = CheckoutSaga::new(&gateway);
        let confirmation = saga
            .run(&snapshot, &request(DeliveryMethod::DriveThru))
            .await
            .unwrap();
        // No shipping fee for drive-thru.
        assert_eq!(confirmation.total, Decimal::new(232, 0));
    }

    assert!(!gateway.calls().contains(&Call::Address));
}

#[tokio::test]
async fn test_bill_carries_the_computed_total() {
    let gateway = MockGateway::default();
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    {
        let saga = CheckoutSaga::new(&gateway);
        saga.run(&snapshot, &request(DeliveryMethod::OnHand))
            .await
            .unwrap();
    }

    assert_eq!(
        *gateway.bill_total.lock().unwrap(),
        Some(Decimal::new(232, 0))
    );
}

#[tokio::test]
async fn test_missing_email_fails_validation_with_zero_network_calls() {
    let gateway = MockGateway::default();
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    {
        let saga = CheckoutSaga::new(&gateway);
        let mut request = request(DeliveryMethod::OnHand);
        request.customer.email = String::new();

        let err = saga.run(&snapshot, &request).await.unwrap_err();
        let CheckoutError::Validation(issues) = err else {
            panic!("expected validation failure, got {err}");
        };
        assert_eq!(issues.missing_fields, vec!["client_email"]);
    }

    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_bill_failure_halts_saga_and_keeps_cart() {
    let gateway = MockGateway {
        fail_bill: true,
        ..MockGateway::default()
    };
    let mut cart = filled_cart();
    let snapshot = cart.load().clone();

    let result = {
        let saga = CheckoutSaga::new(&gateway);
        saga.run(&snapshot, &request(DeliveryMethod::OnHand)).await
    };

    // Order and order lines were never attempted.
    assert_eq!(gateway.calls(), vec![Call::Client, Call::Bill]);

    let outcome = report::finalize(result, &mut cart);
    let CheckoutOutcome::Failed { message } = outcome else {
        panic!("expected failure outcome");
    };
    // Server detail is surfaced verbatim.
    assert_eq!(message, "bill service unavailable");
    assert!(!cart.load().is_empty());
}

#[tokio::test]
async fn test_one_failed_line_reports_partial_order_and_clears_cart() {
    let gateway = MockGateway {
        failing_products: vec![2],
        ..MockGateway::default()
    };
    let mut cart = filled_cart();
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2), line(2, 50, 1)]);

    let result = {
        let saga = CheckoutSaga::new(&gateway);
        saga.run(&snapshot, &request(DeliveryMethod::OnHand)).await
    };

    let Err(CheckoutError::PartialOrder {
        order_id,
        failed,
        attempted,
    }) = &result
    else {
        panic!("expected partial order failure");
    };
    assert_eq!(*order_id, OrderId::new(42));
    assert_eq!((*failed, *attempted), (1, 2));

    // Both line requests went out despite one failing.
    let calls = gateway.calls();
    assert!(calls.contains(&Call::OrderLine(1)));
    assert!(calls.contains(&Call::OrderLine(2)));

    let outcome = report::finalize(result, &mut cart);
    assert!(matches!(
        outcome,
        CheckoutOutcome::PartiallyRecorded { order_id, .. } if order_id == OrderId::new(42)
    ));
    // An order record exists, so the cart is cleared.
    assert!(cart.load().is_empty());
}

#[tokio::test]
async fn test_all_lines_failing_still_reports_partial_order() {
    let gateway = MockGateway {
        failing_products: vec![1, 2],
        ..MockGateway::default()
    };
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2), line(2, 50, 1)]);

    let err = {
        let saga = CheckoutSaga::new(&gateway);
        saga.run(&snapshot, &request(DeliveryMethod::OnHand))
            .await
            .unwrap_err()
    };

    // An order record exists remotely, so the order id must survive
    // into the failure even when every line was rejected.
    let CheckoutError::PartialOrder {
        order_id,
        failed,
        attempted,
    } = err
    else {
        panic!("expected partial order failure, got {err}");
    };
    assert_eq!(order_id, OrderId::new(42));
    assert_eq!((failed, attempted), (2, 2));
}

#[tokio::test]
async fn test_duplicate_submission_rejected_while_in_flight() {
    let gateway = MockGateway {
        client_delay: Some(Duration::from_millis(100)),
        ..MockGateway::default()
    };
    let saga = Arc::new(CheckoutSaga::new(gateway));
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    let request = request(DeliveryMethod::OnHand);

    let first = tokio::spawn({
        let saga = Arc::clone(&saga);
        let snapshot = snapshot.clone();
        let request = request.clone();
        async move { saga.run(&snapshot, &request).await }
    });

    // Let the first submission reach the delayed client step.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = saga.run(&snapshot, &request).await;
    assert!(matches!(second, Err(CheckoutError::SubmissionInFlight)));

    // The first submission is unaffected by the rejected duplicate.
    assert!(first.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_cancelled_submission_releases_the_in_flight_guard() {
    let gateway = MockGateway {
        client_delay: Some(Duration::from_millis(100)),
        ..MockGateway::default()
    };
    let saga = CheckoutSaga::new(gateway);
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    let request = request(DeliveryMethod::OnHand);

    // A caller-side timeout drops the run future mid-flight.
    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), saga.run(&snapshot, &request)).await;
    assert!(cancelled.is_err());

    // The dropped attempt must not leave the saga permanently locked.
    let second = saga.run(&snapshot, &request).await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_fresh_submission_after_failure_restarts_from_scratch() {
    let gateway = MockGateway {
        fail_bill: true,
        ..MockGateway::default()
    };
    let snapshot = CartSnapshot::new(vec![line(1, 100, 2)]);
    let saga = CheckoutSaga::new(&gateway);

    assert!(
        saga.run(&snapshot, &request(DeliveryMethod::OnHand))
            .await
            .is_err()
    );
    assert!(
        saga.run(&snapshot, &request(DeliveryMethod::OnHand))
            .await
            .is_err()
    );

    // Each attempt creates a fresh client; nothing resumes mid-chain.
    assert_eq!(
        gateway.calls(),
        vec![Call::Client, Call::Bill, Call::Client, Call::Bill]
    );
}
