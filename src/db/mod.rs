//! This module is responsible for reading, writing and managing the SQLite database.
//!
//! Money is stored as decimal text and dates as RFC 3339 strings carrying the local offset at the
//! time they were written. Everything handed back to callers is already in local time.

mod migrations;

use crate::error::Res;
use crate::model::{
    clean_name, format_timestamp, parse_timestamp, Amount, ExpenseCategory, Product,
    ProductCategory, ProductUpdates, SaleItem, SaleLine, Snapshot, Transaction, TransactionKind,
    TransactionUpdates,
};
use crate::utils::generate_id;
use anyhow::{bail, ensure, Context};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace, warn};

const TRANSACTION_COLUMNS: &str = "id, kind, amount, date, description, category";
const PRODUCT_COLUMNS: &str = "id, name, price, is_visible, sort_order, category_id";

type Tx<'a> = sqlx::Transaction<'a, Sqlite>;

#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display())
        }
        let pool = connect(path, true).await?;

        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .context("Failed to create schema_version table")?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(&pool)
            .await
            .context("Failed to insert initial schema version")?;

        migrations::run(&pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Created ledger database at {}", path.display());
        Ok(Self { pool })
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite client
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display())
        }
        let pool = connect(path, false).await?;

        let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .context("Failed to read the schema version")?;
        ensure!(
            version <= migrations::CURRENT_VERSION,
            "The database schema version {version} is newer than this program supports ({})",
            migrations::CURRENT_VERSION
        );
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        Ok(Self { pool })
    }

    // ---------------------------------------------------------------------------------------
    // Sales and expenses
    // ---------------------------------------------------------------------------------------

    /// Records a sale of the given catalog products.
    ///
    /// Lines with a quantity of zero are dropped and repeated products are merged. Each product
    /// must exist and be visible; its current name and price are copied onto the sale.
    pub(crate) async fn insert_sale(
        &self,
        lines: &[SaleLine],
        date: NaiveDateTime,
    ) -> Res<Transaction> {
        let mut tx = self.begin().await?;

        let mut merged: Vec<SaleLine> = Vec::new();
        for line in lines.iter().filter(|l| l.quantity > 0) {
            match merged.iter_mut().find(|m| m.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .with_context(|| format!("Quantity overflow for '{}'", line.product_id))?
                }
                None => merged.push(line.clone()),
            }
        }
        if merged.is_empty() {
            bail!("A sale needs at least one item with a quantity above zero")
        }

        let mut items = Vec::with_capacity(merged.len());
        for line in &merged {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .with_context(|| format!("Product '{}' not found", line.product_id))?;
            ensure!(
                product.is_visible(),
                "Product '{}' ({}) is hidden and cannot be sold",
                product.name(),
                product.id()
            );
            items.push(SaleItem::new(
                product.id(),
                product.name(),
                line.quantity,
                product.price(),
            ));
        }

        let sale = Transaction::sale(generate_id("sale"), date, items);
        sale.validate()?;
        insert_transaction_row(&mut tx, &sale).await?;
        commit(tx).await?;
        debug!("Inserted sale {} for {}", sale.id(), sale.amount());
        Ok(sale)
    }

    pub(crate) async fn insert_expense(
        &self,
        amount: Amount,
        category: ExpenseCategory,
        description: Option<String>,
        date: NaiveDateTime,
    ) -> Res<Transaction> {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let expense = Transaction::expense(generate_id("exp"), date, amount, category, description);
        expense.validate()?;

        let mut tx = self.begin().await?;
        insert_transaction_row(&mut tx, &expense).await?;
        commit(tx).await?;
        debug!("Inserted expense {} for {}", expense.id(), expense.amount());
        Ok(expense)
    }

    pub(crate) async fn get_transaction(&self, id: &str) -> Res<Transaction> {
        let mut tx = self.begin().await?;
        let transaction = fetch_transaction(&mut tx, id).await?;
        commit(tx).await?;
        transaction.with_context(|| format!("Transaction '{id}' not found"))
    }

    /// Applies `updates` to one transaction and returns the result.
    ///
    /// The amount of an itemized sale always equals the sum of its items, so it cannot be edited
    /// directly. Sales never carry an expense category.
    pub(crate) async fn update_transaction(
        &self,
        id: &str,
        updates: &TransactionUpdates,
    ) -> Res<Transaction> {
        if updates.is_empty() {
            bail!("No changes were given for transaction '{id}'")
        }
        let mut tx = self.begin().await?;
        let mut transaction = fetch_transaction(&mut tx, id)
            .await?
            .with_context(|| format!("Transaction '{id}' not found"))?;

        if let Some(amount) = updates.amount {
            ensure!(
                !(transaction.is_sale() && !transaction.items().is_empty()),
                "Cannot change the amount of sale '{id}' because it is made of items"
            );
            transaction.amount = amount;
        }
        if let Some(category) = updates.category {
            ensure!(
                transaction.is_expense(),
                "Cannot set an expense category on sale '{id}'"
            );
            transaction.category = Some(category);
        }
        if let Some(description) = &updates.description {
            let description = description.trim();
            transaction.description = (!description.is_empty()).then(|| description.to_string());
        }
        if let Some(date) = updates.date {
            transaction.date = date;
        }
        transaction.validate()?;

        sqlx::query(
            "UPDATE transactions SET amount = ?, date = ?, description = ?, category = ? \
             WHERE id = ?",
        )
        .bind(transaction.amount().value().to_string())
        .bind(format_timestamp(&transaction.date()))
        .bind(transaction.description())
        .bind(transaction.category().map(|c| c.to_string()))
        .bind(id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to update transaction '{id}'"))?;

        commit(tx).await?;
        debug!("Updated transaction {id}");
        Ok(transaction)
    }

    /// Deletes a transaction and its sale items.
    pub(crate) async fn delete_transaction(&self, id: &str) -> Res<()> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM sale_items WHERE transaction_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete the items of transaction '{id}'"))?;
        let deleted = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete transaction '{id}'"))?
            .rows_affected();
        if deleted == 0 {
            bail!("Transaction '{id}' not found")
        }
        commit(tx).await?;
        debug!("Deleted transaction {id}");
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // Product catalog
    // ---------------------------------------------------------------------------------------

    /// Adds a visible product at the end of the catalog.
    pub(crate) async fn insert_product(
        &self,
        name: &str,
        price: Amount,
        category_id: Option<&str>,
    ) -> Res<Product> {
        let name = clean_name(name, "product")?;
        price.ensure_money("price")?;

        let mut tx = self.begin().await?;
        if let Some(category_id) = category_id {
            ensure_category_exists(&mut tx, category_id).await?;
        }
        let (sort_order,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM products")
                .fetch_one(&mut *tx)
                .await
                .context("Failed to compute the next sort order")?;

        let product = Product::new(
            generate_id("prod"),
            name,
            price,
            sort_order,
            category_id.map(str::to_string),
        );
        upsert_product(&mut tx, &product).await?;
        commit(tx).await?;
        debug!("Inserted product {} ({})", product.name(), product.id());
        Ok(product)
    }

    /// Writes fully formed products, e.g. a starter catalog, in one transaction.
    pub(crate) async fn insert_products(&self, products: &[Product]) -> Res<()> {
        let mut tx = self.begin().await?;
        for product in products {
            upsert_product(&mut tx, product).await?;
        }
        commit(tx).await?;
        debug!("Inserted {} products", products.len());
        Ok(())
    }

    /// Applies every update or none of them.
    pub(crate) async fn update_products(&self, updates: &[ProductUpdates]) -> Res<Vec<Product>> {
        let mut tx = self.begin().await?;
        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            let mut product = fetch_product(&mut tx, &update.id)
                .await?
                .with_context(|| format!("Product '{}' not found", update.id))?;
            if let Some(name) = &update.name {
                product.name = clean_name(name, "product")?;
            }
            if let Some(price) = update.price {
                price.ensure_money("price")?;
                product.price = price;
            }
            if let Some(visible) = update.visible {
                product.is_visible = visible;
            }
            if let Some(sort_order) = update.sort_order {
                product.sort_order = sort_order;
            }
            if update.clear_category {
                product.category_id = None;
            } else if let Some(category_id) = &update.category {
                ensure_category_exists(&mut tx, category_id).await?;
                product.category_id = Some(category_id.clone());
            }
            upsert_product(&mut tx, &product).await?;
            updated.push(product);
        }
        commit(tx).await?;
        debug!("Updated {} products", updated.len());
        Ok(updated)
    }

    /// Removes a product from the catalog. Past sales keep their copy of its name and price.
    pub(crate) async fn delete_product(&self, id: &str) -> Res<()> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete product '{id}'"))?
            .rows_affected();
        if deleted == 0 {
            bail!("Product '{id}' not found")
        }
        debug!("Deleted product {id}");
        Ok(())
    }

    pub(crate) async fn insert_product_category(&self, name: &str) -> Res<ProductCategory> {
        let category = ProductCategory::new(generate_id("cat"), clean_name(name, "category")?);
        sqlx::query("INSERT INTO product_categories (id, name) VALUES (?, ?)")
            .bind(category.id())
            .bind(category.name())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert category '{}'", category.name()))?;
        debug!("Inserted category {} ({})", category.name(), category.id());
        Ok(category)
    }

    pub(crate) async fn rename_product_category(
        &self,
        id: &str,
        name: &str,
    ) -> Res<ProductCategory> {
        let category = ProductCategory::new(id, clean_name(name, "category")?);
        let renamed = sqlx::query("UPDATE product_categories SET name = ? WHERE id = ?")
            .bind(category.name())
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to rename category '{id}'"))?
            .rows_affected();
        if renamed == 0 {
            bail!("Category '{id}' not found")
        }
        Ok(category)
    }

    /// Deletes a product category. Products in it are kept and become uncategorized.
    ///
    /// Returns the number of products that were detached from the category.
    pub(crate) async fn delete_product_category(&self, id: &str) -> Res<u64> {
        let mut tx = self.begin().await?;
        let detached = sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to detach products from category '{id}'"))?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM product_categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to delete category '{id}'"))?
            .rows_affected();
        if deleted == 0 {
            bail!("Category '{id}' not found")
        }
        commit(tx).await?;
        debug!("Deleted category {id}, detached {detached} products");
        Ok(detached)
    }

    // ---------------------------------------------------------------------------------------
    // Snapshot
    // ---------------------------------------------------------------------------------------

    /// Reads the whole ledger.
    ///
    /// Products come in catalog order, categories by name and transactions newest first. Rows
    /// that cannot be parsed are left out and counted in `Snapshot::skipped`.
    pub(crate) async fn load_snapshot(&self) -> Res<Snapshot> {
        let mut tx = self.begin().await?;
        let products = fetch_products(&mut tx).await?;
        let categories = fetch_categories(&mut tx).await?;

        let item_rows = sqlx::query(
            "SELECT transaction_id, product_id, product_name, quantity, unit_price \
             FROM sale_items ORDER BY transaction_id, position",
        )
        .fetch_all(&mut *tx)
        .await
        .context("Failed to load sale items")?;
        let rows = sqlx::query(&format!("SELECT {TRANSACTION_COLUMNS} FROM transactions"))
            .fetch_all(&mut *tx)
            .await
            .context("Failed to load transactions")?;
        commit(tx).await?;

        let mut items: HashMap<String, Vec<SaleItem>> = HashMap::new();
        let mut broken: HashSet<String> = HashSet::new();
        for row in &item_rows {
            let transaction_id: String = row
                .try_get("transaction_id")
                .context("Failed to read sale item")?;
            match parse_sale_item(row) {
                Ok(item) => items.entry(transaction_id).or_default().push(item),
                Err(e) => {
                    warn!("Unreadable item on transaction {transaction_id}: {e:#}");
                    broken.insert(transaction_id);
                }
            }
        }

        let mut skipped = 0;
        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id").context("Failed to read transaction")?;
            let own_items = items.remove(&id).unwrap_or_default();
            if broken.contains(&id) {
                skipped += 1;
                continue;
            }
            match parse_transaction(row, own_items) {
                Ok(t) => transactions.push(t),
                Err(e) => {
                    warn!("Skipping unreadable transaction {id}: {e:#}");
                    skipped += 1;
                }
            }
        }
        transactions.sort_by(|a, b| b.date().cmp(&a.date()));
        trace!(
            "Loaded {} transactions, {} products, {} categories",
            transactions.len(),
            products.len(),
            categories.len()
        );

        Ok(Snapshot::new(transactions, products, categories).with_skipped(skipped))
    }

    pub(crate) async fn count_transactions(&self) -> Res<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn begin(&self) -> Res<Tx<'static>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin database transaction")
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at '{}'", path.display()))
}

async fn commit(tx: Tx<'_>) -> Res<()> {
    tx.commit()
        .await
        .context("Failed to commit database transaction")
}

async fn insert_transaction_row(tx: &mut Tx<'_>, t: &Transaction) -> Res<()> {
    sqlx::query(&format!(
        "INSERT INTO transactions ({TRANSACTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
    ))
    .bind(t.id())
    .bind(t.kind().to_string())
    .bind(t.amount().value().to_string())
    .bind(format_timestamp(&t.date()))
    .bind(t.description())
    .bind(t.category().map(|c| c.to_string()))
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Failed to insert transaction '{}'", t.id()))?;

    for (position, item) in t.items().iter().enumerate() {
        sqlx::query(
            "INSERT INTO sale_items \
             (transaction_id, position, product_id, product_name, quantity, unit_price) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(t.id())
        .bind(i64::try_from(position).context("Too many sale items")?)
        .bind(item.product_id())
        .bind(item.product_name())
        .bind(i64::from(item.quantity()))
        .bind(item.unit_price().value().to_string())
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to insert items of sale '{}'", t.id()))?;
    }
    Ok(())
}

async fn fetch_transaction(tx: &mut Tx<'_>, id: &str) -> Res<Option<Transaction>> {
    let row = sqlx::query(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .with_context(|| format!("Failed to load transaction '{id}'"))?;
    let Some(row) = row else {
        return Ok(None);
    };

    let item_rows = sqlx::query(
        "SELECT product_id, product_name, quantity, unit_price \
         FROM sale_items WHERE transaction_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut **tx)
    .await
    .with_context(|| format!("Failed to load the items of transaction '{id}'"))?;
    let items = item_rows
        .iter()
        .map(parse_sale_item)
        .collect::<Res<Vec<_>>>()?;

    parse_transaction(&row, items).map(Some)
}

fn parse_transaction(row: &SqliteRow, items: Vec<SaleItem>) -> Res<Transaction> {
    let kind: String = row.try_get("kind")?;
    let amount: String = row.try_get("amount")?;
    let date: String = row.try_get("date")?;
    let category: Option<String> = row.try_get("category")?;
    Ok(Transaction {
        id: row.try_get("id")?,
        kind: TransactionKind::from_str(&kind)
            .with_context(|| format!("Unknown transaction kind '{kind}'"))?,
        amount: Amount::from_str(&amount).with_context(|| format!("Invalid amount '{amount}'"))?,
        date: parse_timestamp(&date)?,
        description: row.try_get("description")?,
        items,
        category: category
            .map(|c| {
                ExpenseCategory::from_str(&c)
                    .with_context(|| format!("Unknown expense category '{c}'"))
            })
            .transpose()?,
    })
}

fn parse_sale_item(row: &SqliteRow) -> Res<SaleItem> {
    let quantity: i64 = row.try_get("quantity")?;
    let unit_price: String = row.try_get("unit_price")?;
    Ok(SaleItem {
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: u32::try_from(quantity)
            .with_context(|| format!("Invalid quantity {quantity}"))?,
        unit_price: Amount::from_str(&unit_price)
            .with_context(|| format!("Invalid unit price '{unit_price}'"))?,
    })
}

async fn fetch_product(tx: &mut Tx<'_>, id: &str) -> Res<Option<Product>> {
    sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .with_context(|| format!("Failed to load product '{id}'"))?
        .as_ref()
        .map(parse_product)
        .transpose()
}

async fn fetch_products(tx: &mut Tx<'_>) -> Res<Vec<Product>> {
    sqlx::query(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY sort_order, name"
    ))
    .fetch_all(&mut **tx)
    .await
    .context("Failed to load products")?
    .iter()
    .map(parse_product)
    .collect()
}

fn parse_product(row: &SqliteRow) -> Res<Product> {
    let id: String = row.try_get("id")?;
    let price: String = row.try_get("price")?;
    Ok(Product {
        price: Amount::from_str(&price)
            .with_context(|| format!("Invalid price '{price}' on product '{id}'"))?,
        id,
        name: row.try_get("name")?,
        is_visible: row.try_get("is_visible")?,
        sort_order: row.try_get("sort_order")?,
        category_id: row.try_get("category_id")?,
    })
}

async fn upsert_product(tx: &mut Tx<'_>, product: &Product) -> Res<()> {
    sqlx::query(&format!(
        "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT (id) DO UPDATE SET name = excluded.name, price = excluded.price, \
         is_visible = excluded.is_visible, sort_order = excluded.sort_order, \
         category_id = excluded.category_id"
    ))
    .bind(product.id())
    .bind(product.name())
    .bind(product.price().value().to_string())
    .bind(product.is_visible())
    .bind(product.sort_order())
    .bind(product.category_id())
    .execute(&mut **tx)
    .await
    .with_context(|| format!("Failed to save product '{}'", product.id()))?;
    Ok(())
}

async fn fetch_categories(tx: &mut Tx<'_>) -> Res<Vec<ProductCategory>> {
    let rows = sqlx::query("SELECT id, name FROM product_categories ORDER BY name, id")
        .fetch_all(&mut **tx)
        .await
        .context("Failed to load categories")?;
    rows.iter()
        .map(|row| -> Res<ProductCategory> {
            let id: String = row.try_get("id")?;
            let name: String = row.try_get("name")?;
            Ok(ProductCategory::new(id, name))
        })
        .collect()
}

async fn ensure_category_exists(tx: &mut Tx<'_>, id: &str) -> Res<()> {
    let found: Option<(String,)> = sqlx::query_as("SELECT id FROM product_categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .with_context(|| format!("Failed to look up category '{id}'"))?;
    ensure!(found.is_some(), "Category '{id}' not found");
    Ok(())
}
