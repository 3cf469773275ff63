use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products};

use super::models::{CartItemRow, NewCartItemRow, ProductRow};

fn to_line(item: CartItemRow, product: ProductRow) -> CartLine {
    CartLine {
        id: item.id,
        product_id: product.id,
        product_name: product.name,
        quantity: item.quantity,
        unit_price: product.price,
        stock: product.stock,
    }
}

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn line_by_id(
        conn: &mut PgConnection,
        line_id: Uuid,
    ) -> Result<Option<CartLine>, DomainError> {
        let row = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::id.eq(line_id))
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .first::<(CartItemRow, ProductRow)>(conn)
            .optional()?;
        Ok(row.map(|(item, product)| to_line(item, product)))
    }
}

impl CartRepository for DieselCartRepository {
    fn load_cart(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load::<(CartItemRow, ProductRow)>(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(item, product)| to_line(item, product))
            .collect())
    }

    fn upsert_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let mut conn = self.pool.get()?;
        let row: CartItemRow = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity,
            })
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(quantity))
            .returning(CartItemRow::as_returning())
            .get_result(&mut conn)?;

        Self::line_by_id(&mut conn, row.id)?
            .ok_or_else(|| DomainError::Internal("cart line vanished after upsert".to_string()))
    }

    fn update_quantity(
        &self,
        user_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            cart_items::table
                .filter(cart_items::id.eq(line_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .set(cart_items::quantity.eq(quantity))
        .execute(&mut conn)?;

        if updated == 0 {
            return Ok(None);
        }
        Self::line_by_id(&mut conn, line_id)
    }

    fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(line_id))
                .filter(cart_items::user_id.eq(user_id)),
        )
        .execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::ports::CartRepository;
    use crate::infrastructure::test_support::{add_cart_line, product_by_name, setup_db};

    #[tokio::test]
    async fn load_cart_returns_lines_in_insertion_order() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let mouse = product_by_name(&pool, "Wireless Mouse");
        let stand = product_by_name(&pool, "Laptop Stand");
        add_cart_line(&pool, user_id, mouse.id, 2);
        add_cart_line(&pool, user_id, stand.id, 1);

        let lines = repo.load_cart(user_id).expect("load failed");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Wireless Mouse");
        assert_eq!(lines[0].stock, 150);
        assert_eq!(lines[1].product_name, "Laptop Stand");
    }

    #[tokio::test]
    async fn load_cart_is_empty_for_fresh_user() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool);

        let lines = repo.load_cart(Uuid::new_v4()).expect("load failed");
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_quantity_for_existing_product() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let user_id = Uuid::new_v4();
        let mouse = product_by_name(&pool, "Wireless Mouse");

        let first = repo
            .upsert_line(user_id, mouse.id, 2)
            .expect("upsert failed");
        let second = repo
            .upsert_line(user_id, mouse.id, 5)
            .expect("upsert failed");

        // Same row, replaced quantity: at most one line per product.
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        assert_eq!(repo.load_cart(user_id).expect("load failed").len(), 1);
    }

    #[tokio::test]
    async fn update_and_remove_are_scoped_to_owner() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mouse = product_by_name(&pool, "Wireless Mouse");
        let line = repo.upsert_line(owner, mouse.id, 1).expect("upsert failed");

        assert!(repo
            .update_quantity(stranger, line.id, 3)
            .expect("update failed")
            .is_none());
        assert!(!repo.remove_line(stranger, line.id).expect("remove failed"));

        let updated = repo
            .update_quantity(owner, line.id, 3)
            .expect("update failed")
            .expect("line should exist");
        assert_eq!(updated.quantity, 3);
        assert!(repo.remove_line(owner, line.id).expect("remove failed"));
        assert!(repo.load_cart(owner).expect("load failed").is_empty());
    }
}
