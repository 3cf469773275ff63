use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLine;
use crate::domain::errors::{CheckoutError, DomainError};
use crate::domain::order::{OrderLineView, OrderStatus, OrderView, PlacedOrder, PlacedOrderLine};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, order_items, orders, products};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    /// The commit pass runs inside `Connection::transaction`, which rolls
    /// everything back on any `Err` exit, so no caller ever observes a
    /// partially-written order.
    fn commit_checkout(
        &self,
        user_id: Uuid,
        order_number: &str,
        address: &str,
        phone: &str,
        lines: &[CartLine],
    ) -> Result<PlacedOrder, CheckoutError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, CheckoutError, _>(|conn| {
            // 1. Insert the order with a placeholder total.
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    order_number: order_number.to_string(),
                    address: address.to_string(),
                    phone: phone.to_string(),
                    total: BigDecimal::from(0),
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .execute(conn)?;

            // 2. Per cart line, in cart order: freeze the snapshot price
            //    into an order line, decrement stock, accumulate the total.
            let mut total = BigDecimal::from(0);
            let mut placed_lines = Vec::with_capacity(lines.len());
            for line in lines {
                diesel::insert_into(order_items::table)
                    .values(&NewOrderItemRow {
                        id: Uuid::new_v4(),
                        order_id,
                        product_id: line.product_id,
                        quantity: line.quantity,
                        price: line.unit_price.clone(),
                    })
                    .execute(conn)?;

                // Conditional decrement: the floor check and the subtraction
                // are one atomic statement, the sole enforcement point for
                // the non-negative-stock invariant. Zero rows updated means
                // a concurrent checkout consumed the stock since our
                // snapshot; abort the whole transaction.
                let updated = diesel::update(
                    products::table
                        .filter(products::id.eq(line.product_id))
                        .filter(products::stock.ge(line.quantity)),
                )
                .set(products::stock.eq(products::stock - line.quantity))
                .execute(conn)?;
                if updated == 0 {
                    return Err(CheckoutError::Failed(format!(
                        "stock for product {} changed during checkout",
                        line.product_id
                    )));
                }

                let subtotal = line.subtotal();
                total += subtotal.clone();
                placed_lines.push(PlacedOrderLine {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.clone(),
                    subtotal,
                });
            }

            // 3. Replace the placeholder total with the accumulated sum.
            let order: OrderRow = diesel::update(orders::table.find(order_id))
                .set(orders::total.eq(&total))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 4. Clear the user's cart.
            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;

            Ok(PlacedOrder {
                id: order.id,
                order_number: order.order_number,
                address: order.address,
                phone: order.phone,
                total: order.total,
                status: OrderStatus::Pending,
                created_at: order.created_at,
                lines: placed_lines,
            })
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        let mut views = Vec::with_capacity(rows.len());
        for order in rows {
            let lines = order_items::table
                .inner_join(products::table)
                .filter(order_items::order_id.eq(order.id))
                .order(order_items::created_at.asc())
                .select((OrderItemRow::as_select(), products::name))
                .load::<(OrderItemRow, String)>(&mut conn)?;

            views.push(OrderView {
                id: order.id,
                order_number: order.order_number,
                address: order.address,
                phone: order.phone,
                total: order.total,
                status: order.status,
                created_at: order.created_at,
                lines: lines
                    .into_iter()
                    .map(|(item, product_name)| OrderLineView {
                        id: item.id,
                        product_id: item.product_id,
                        product_name,
                        quantity: item.quantity,
                        unit_price: item.price,
                    })
                    .collect(),
            });
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::db::DbPool;
    use crate::domain::cart::CartLine;
    use crate::domain::errors::CheckoutError;
    use crate::domain::ports::{CartRepository, OrderRepository};
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::test_support::{
        add_cart_line, cart_size, product_by_name, set_stock, setup_db, stock_of,
    };
    use crate::schema::orders;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn snapshot(pool: &DbPool, user_id: Uuid) -> Vec<CartLine> {
        DieselCartRepository::new(pool.clone())
            .load_cart(user_id)
            .expect("load_cart failed")
    }

    fn order_count(pool: &DbPool) -> i64 {
        let mut conn = pool.get().expect("Failed to get connection");
        orders::table
            .count()
            .get_result(&mut conn)
            .expect("count failed")
    }

    #[tokio::test]
    async fn commit_persists_order_decrements_stock_and_clears_cart() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let mouse = product_by_name(&pool, "Wireless Mouse");
        add_cart_line(&pool, user_id, mouse.id, 2);

        let lines = snapshot(&pool, user_id);
        let order = repo
            .commit_checkout(user_id, "ORD-20250610-TEST01", "1 Main St", "555-0100", &lines)
            .expect("commit failed");

        assert_eq!(order.order_number, "ORD-20250610-TEST01");
        assert_eq!(order.total, dec("59.98"));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].unit_price, dec("29.99"));
        assert_eq!(order.lines[0].subtotal, dec("59.98"));
        assert_eq!(stock_of(&pool, mouse.id), 148);
        assert_eq!(cart_size(&pool, user_id), 0);

        let listed = repo.list_for_user(user_id).expect("list failed");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total, dec("59.98"));
        assert_eq!(listed[0].status, "pending");
        assert_eq!(listed[0].lines.len(), 1);
        assert_eq!(listed[0].lines[0].product_name, "Wireless Mouse");
    }

    #[tokio::test]
    async fn multi_line_commit_sums_subtotals_in_cart_order() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let mouse = product_by_name(&pool, "Wireless Mouse");
        let cable = product_by_name(&pool, "USB-C Cable");
        add_cart_line(&pool, user_id, mouse.id, 3);
        add_cart_line(&pool, user_id, cable.id, 2);

        let lines = snapshot(&pool, user_id);
        let order = repo
            .commit_checkout(user_id, "ORD-20250610-TEST02", "1 Main St", "555-0100", &lines)
            .expect("commit failed");

        // 3 × 29.99 + 2 × 19.99
        assert_eq!(order.total, dec("129.95"));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].product_id, mouse.id);
        assert_eq!(order.lines[1].product_id, cable.id);
        assert_eq!(stock_of(&pool, mouse.id), 147);
        assert_eq!(stock_of(&pool, cable.id), 198);
    }

    #[tokio::test]
    async fn stale_snapshot_rolls_back_everything() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let watch = product_by_name(&pool, "Smart Watch");
        add_cart_line(&pool, user_id, watch.id, 5);

        // Snapshot sees 35 in stock, then a concurrent checkout drains it.
        let lines = snapshot(&pool, user_id);
        assert_eq!(lines[0].stock, 35);
        set_stock(&pool, watch.id, 2);

        let err = repo
            .commit_checkout(user_id, "ORD-20250610-TEST03", "1 Main St", "555-0100", &lines)
            .expect_err("commit must fail");

        assert!(matches!(err, CheckoutError::Failed(_)));
        // The order insert and the cart delete were rolled back with the
        // rejected decrement.
        assert_eq!(order_count(&pool), 0);
        assert_eq!(stock_of(&pool, watch.id), 2);
        assert_eq!(cart_size(&pool, user_id), 1);
    }

    #[tokio::test]
    async fn duplicate_order_number_reports_collision() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let speaker = product_by_name(&pool, "Bluetooth Speaker");

        add_cart_line(&pool, user_id, speaker.id, 1);
        let lines = snapshot(&pool, user_id);
        repo.commit_checkout(user_id, "ORD-20250610-DUPE", "1 Main St", "555-0100", &lines)
            .expect("first commit failed");

        add_cart_line(&pool, user_id, speaker.id, 1);
        let lines = snapshot(&pool, user_id);
        let err = repo
            .commit_checkout(user_id, "ORD-20250610-DUPE", "1 Main St", "555-0100", &lines)
            .expect_err("second commit must fail");

        assert!(matches!(err, CheckoutError::OrderNumberTaken));
        // The failed attempt left no trace: one order, one decrement.
        assert_eq!(order_count(&pool), 1);
        assert_eq!(stock_of(&pool, speaker.id), 49);
        assert_eq!(cart_size(&pool, user_id), 1);
    }

    #[tokio::test]
    async fn list_for_user_is_newest_first_and_scoped_to_user() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let case = product_by_name(&pool, "Phone Case");

        for (user, number) in [
            (alice, "ORD-20250610-LIST1"),
            (alice, "ORD-20250610-LIST2"),
            (bob, "ORD-20250610-LIST3"),
        ] {
            add_cart_line(&pool, user, case.id, 1);
            let lines = snapshot(&pool, user);
            repo.commit_checkout(user, number, "1 Main St", "555-0100", &lines)
                .expect("commit failed");
        }

        let listed = repo.list_for_user(alice).expect("list failed");
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert_eq!(listed[0].order_number, "ORD-20250610-LIST2");
        assert_eq!(listed[1].order_number, "ORD-20250610-LIST1");
    }

    #[tokio::test]
    async fn frozen_line_price_survives_product_price_change() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let hub = product_by_name(&pool, "USB-C Hub");
        add_cart_line(&pool, user_id, hub.id, 1);

        let lines = snapshot(&pool, user_id);
        repo.commit_checkout(user_id, "ORD-20250610-FROZE", "1 Main St", "555-0100", &lines)
            .expect("commit failed");

        // Reprice the product after the sale.
        let mut conn = pool.get().expect("Failed to get connection");
        diesel::update(crate::schema::products::table.find(hub.id))
            .set(crate::schema::products::price.eq(dec("99.99")))
            .execute(&mut conn)
            .expect("update failed");

        let listed = repo.list_for_user(user_id).expect("list failed");
        assert_eq!(listed[0].lines[0].unit_price, dec("49.99"));
        assert_eq!(listed[0].total, dec("49.99"));
    }
}
