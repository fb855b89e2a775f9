use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Context, ServiceError};
use crate::identity::RequestIdentity;
use crate::models::{
    Order, OrderDetails, OrderFilter, OrderItemRequest, OrderStatus, OrderSummary, Page,
    Pagination,
};
use crate::repositories::{OrderRepository, ProductRepository};
use crate::services::pricing::calculate_order_items;

/// A status change a restaurant can apply to one of its orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderTransition {
    Approve,
    Dispatch,
    Deliver,
    Cancel,
}

impl OrderTransition {
    pub const ALL: [OrderTransition; 4] = [
        OrderTransition::Approve,
        OrderTransition::Dispatch,
        OrderTransition::Deliver,
        OrderTransition::Cancel,
    ];

    pub fn sources(self) -> &'static [OrderStatus] {
        match self {
            OrderTransition::Approve => &[OrderStatus::Pending],
            OrderTransition::Dispatch => &[OrderStatus::Processing],
            OrderTransition::Deliver => &[OrderStatus::Delivering],
            OrderTransition::Cancel => &[OrderStatus::Pending, OrderStatus::Processing],
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            OrderTransition::Approve => OrderStatus::Processing,
            OrderTransition::Dispatch => OrderStatus::Delivering,
            OrderTransition::Deliver => OrderStatus::Delivered,
            OrderTransition::Cancel => OrderStatus::Canceled,
        }
    }

    pub fn can_apply(self, from: OrderStatus) -> bool {
        self.sources().contains(&from)
    }

    fn rejection(self) -> ServiceError {
        match self {
            OrderTransition::Approve => ServiceError::OrderCannotBeApproved,
            OrderTransition::Dispatch => ServiceError::OrderCannotBeDispatched,
            OrderTransition::Deliver => ServiceError::OrderCannotBeDelivered,
            OrderTransition::Cancel => ServiceError::OrderCannotBeCancelled,
        }
    }
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { orders, products }
    }

    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        restaurant_id: Uuid,
        items: &[OrderItemRequest],
    ) -> Result<OrderDetails, ServiceError> {
        let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();

        let products = self
            .products
            .get_products_by_ids_and_restaurant_id(&product_ids, restaurant_id)
            .await
            .context("get products by IDs and restaurant ID")?;

        let mut summary = calculate_order_items(&products, items).map_err(|err| {
            warn!(error = %err, "order items rejected");
            ServiceError::SomeProductsNotFound
        })?;

        let order = Order::new(customer_id, restaurant_id, summary.total_in_cents);
        for item in &mut summary.items {
            item.order_id = order.id;
        }

        self.orders
            .create_order_with_items(&order, &summary.items)
            .await
            .context("create order with items")?;

        info!(order_id = %order.id, total_in_cents = order.total_in_cents, "order created");

        Ok(OrderDetails {
            order,
            items: summary.items,
        })
    }

    pub async fn list_orders(
        &self,
        identity: &RequestIdentity,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<Page<OrderSummary>, ServiceError> {
        let restaurant_id = identity.restaurant_id()?;

        let (items, total) = self
            .orders
            .list_orders(restaurant_id, filter, pagination)
            .await
            .context("list orders")?;

        Ok(Page {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
        })
    }

    pub async fn approve_order(
        &self,
        identity: &RequestIdentity,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.transition(identity, order_id, OrderTransition::Approve)
            .await
    }

    pub async fn dispatch_order(
        &self,
        identity: &RequestIdentity,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.transition(identity, order_id, OrderTransition::Dispatch)
            .await
    }

    pub async fn deliver_order(
        &self,
        identity: &RequestIdentity,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.transition(identity, order_id, OrderTransition::Deliver)
            .await
    }

    pub async fn cancel_order(
        &self,
        identity: &RequestIdentity,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.transition(identity, order_id, OrderTransition::Cancel)
            .await
    }

    // Read, check, then write. Two concurrent requests for the same order can
    // both pass the status check; nothing here locks the row.
    #[instrument(skip(self, identity), fields(restaurant_id = ?identity.restaurant_id))]
    pub async fn transition(
        &self,
        identity: &RequestIdentity,
        order_id: Uuid,
        transition: OrderTransition,
    ) -> Result<(), ServiceError> {
        let restaurant_id = identity.restaurant_id()?;

        let order = self
            .orders
            .get_order_by_id(order_id)
            .await
            .context("get order by ID")?
            .ok_or(ServiceError::OrderNotFound)?;

        if order.restaurant_id != restaurant_id {
            return Err(ServiceError::OrderDoesNotBelongToRestaurant);
        }

        if !transition.can_apply(order.status) {
            return Err(transition.rejection());
        }

        self.orders
            .update_status(order.id, transition.target())
            .await
            .context("update order status")?;

        info!(%order_id, from = ?order.status, to = ?transition.target(), "order status changed");
        Ok(())
    }
}
