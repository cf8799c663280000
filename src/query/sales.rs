use log::debug;

use crate::entities::{Customer, Sale};
use crate::error::LedgerResult;
use crate::record::Stored;
use crate::store::{RecordStore, RecordsExt, Selector};

use super::{DateWindow, ProductSaleLine, Queries, Tally, TopCustomer, TopSellingItem};

impl<'a, S: RecordStore> Queries<'a, S> {
    /// Active sales dated inside `window`, in store order.
    pub fn sales_in(&self, window: DateWindow) -> LedgerResult<Vec<Stored<Sale>>> {
        let selector = Selector::new().active().between(window.start, window.end);
        Ok(self.ledger.store().records::<Sale>().select(&selector)?)
    }

    fn resolve_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.ledger.config().default_top_limit)
    }

    /// Products ranked by sold value across the sales in `window`.
    pub fn top_selling_items(
        &self,
        window: DateWindow,
        limit: Option<usize>,
    ) -> LedgerResult<Vec<TopSellingItem>> {
        let mut tally = Tally::new();
        for sale in self.sales_in(window)? {
            for item in &sale.data.data.items {
                let row = tally.entry(item.product_id.clone(), || TopSellingItem {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    quantity: Default::default(),
                    total: Default::default(),
                });
                row.quantity += item.quantity;
                row.total += item.total;
            }
        }

        let items = tally.ranked(self.resolve_limit(limit), |row| row.total);
        debug!(
            "event=report module=query name=top_selling_items rows={}",
            items.len()
        );
        Ok(items)
    }

    /// Customers ranked by spend across the sales in `window`. Sales with
    /// no customer are skipped.
    pub fn top_customers(
        &self,
        window: DateWindow,
        limit: Option<usize>,
    ) -> LedgerResult<Vec<TopCustomer>> {
        let mut tally = Tally::new();
        for sale in self.sales_in(window)? {
            let sale = sale.data.data;
            let Some(customer_id) = sale.customer_id else {
                continue;
            };
            let row = tally.entry(customer_id.clone(), || TopCustomer {
                customer_id,
                name: None,
                sales_count: 0,
                total: Default::default(),
            });
            if row.name.is_none() {
                row.name = sale.customer_name.filter(|name| !name.is_empty());
            }
            row.sales_count += 1;
            row.total += sale.total;
        }

        let mut customers = tally.ranked(self.resolve_limit(limit), |row| row.total);
        let directory = self.ledger.store().records::<Customer>();
        for row in customers.iter_mut().filter(|row| row.name.is_none()) {
            row.name = directory
                .get(&row.customer_id)?
                .map(|customer| customer.data.data.name);
        }

        debug!(
            "event=report module=query name=top_customers rows={}",
            customers.len()
        );
        Ok(customers)
    }

    /// Every line selling `product_id` across the sales in `window`.
    pub fn sale_items_by_product(
        &self,
        product_id: &str,
        window: DateWindow,
    ) -> LedgerResult<Vec<ProductSaleLine>> {
        let mut lines = Vec::new();
        for sale in self.sales_in(window)? {
            let record = sale.data;
            for item in record.data.items {
                if item.product_id == product_id {
                    lines.push(ProductSaleLine {
                        sale_id: record.id.clone(),
                        date: record.data.date,
                        item,
                    });
                }
            }
        }
        Ok(lines)
    }
}
