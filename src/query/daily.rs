use chrono::{NaiveDate, Timelike};
use log::debug;

use crate::entities::{Sale, Transaction};
use crate::error::LedgerResult;
use crate::record::Stored;
use crate::store::{RecordStore, RecordsExt, Selector};

use super::{local_date, DateWindow, HourlySales, Queries};

impl<'a, S: RecordStore> Queries<'a, S> {
    /// The store's current local calendar date.
    pub fn today(&self) -> NaiveDate {
        local_date(self.ledger.now(), self.ledger.config().offset())
    }

    fn today_window(&self) -> DateWindow {
        DateWindow::day(self.today(), self.ledger.config().offset())
    }

    /// Sales per local hour of `day`, one bucket for every hour from
    /// opening to closing inclusive. Sales outside that window are left out.
    pub fn hourly_sales(&self, day: NaiveDate) -> LedgerResult<Vec<HourlySales>> {
        let config = self.ledger.config();
        let offset = config.offset();
        let mut buckets: Vec<HourlySales> = (config.opening_hour..=config.closing_hour)
            .map(|hour| HourlySales {
                hour,
                label: format!("{:02}:00", hour),
                sales_count: 0,
                total: Default::default(),
            })
            .collect();

        for sale in self.sales_in(DateWindow::day(day, offset))? {
            let hour = sale.data.data.date.with_timezone(&offset).hour();
            if hour < config.opening_hour || hour > config.closing_hour {
                continue;
            }
            let bucket = &mut buckets[(hour - config.opening_hour) as usize];
            bucket.sales_count += 1;
            bucket.total += sale.data.data.total;
        }

        debug!(
            "event=report module=query name=hourly_sales day={} buckets={}",
            day,
            buckets.len()
        );
        Ok(buckets)
    }

    pub fn hourly_sales_today(&self) -> LedgerResult<Vec<HourlySales>> {
        self.hourly_sales(self.today())
    }

    /// Today's active sales sold on credit.
    pub fn today_credit_sales(&self) -> LedgerResult<Vec<Stored<Sale>>> {
        let mut sales = self.sales_in(self.today_window())?;
        sales.retain(|sale| sale.data.data.is_credit());
        Ok(sales)
    }

    /// Today's active transactions linked to a customer.
    pub fn today_customer_transactions(&self) -> LedgerResult<Vec<Stored<Transaction>>> {
        let window = self.today_window();
        let selector = Selector::new().active().between(window.start, window.end);
        let mut transactions = self
            .ledger
            .store()
            .records::<Transaction>()
            .select(&selector)?;
        transactions.retain(|transaction| transaction.data.data.customer_id.is_some());
        Ok(transactions)
    }
}
