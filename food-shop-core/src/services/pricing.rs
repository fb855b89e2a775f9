use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{OrderItem, OrderItemRequest, OrderItemSummary, Product};

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("product {0} is not available")]
    ProductUnavailable(Uuid),
    #[error("order total overflows")]
    TotalOverflow,
}

/// Prices `requests` against `products`, which must already be scoped to the
/// ordering restaurant. Quantities are assumed positive.
///
/// Either every request is priced or none is.
pub fn calculate_order_items(
    products: &[Product],
    requests: &[OrderItemRequest],
) -> Result<OrderItemSummary, PricingError> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(requests.len());
    let mut total_in_cents: i64 = 0;

    for request in requests {
        let product = by_id
            .get(&request.product_id)
            .ok_or(PricingError::ProductUnavailable(request.product_id))?;

        let subtotal = i64::from(product.price_in_cents)
            .checked_mul(i64::from(request.quantity))
            .ok_or(PricingError::TotalOverflow)?;
        total_in_cents = total_in_cents
            .checked_add(subtotal)
            .ok_or(PricingError::TotalOverflow)?;

        items.push(OrderItem::new(
            product.id,
            request.quantity,
            product.price_in_cents,
        ));
    }

    Ok(OrderItemSummary {
        items,
        total_in_cents,
    })
}
