//! Print Rendering
//!
//! Printable HTML documents for a single client card or the whole archive,
//! plus a terminal table for listings.

use jiff::{Timestamp, tz::TimeZone};
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use tabled::{builder::Builder, settings::Style};

use crate::records::Record;

/// Formats dates and prices for display.
#[derive(Debug, Clone)]
pub struct Renderer {
    currency: &'static Currency,
    time_zone: TimeZone,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(iso::EUR, TimeZone::system())
    }
}

impl Renderer {
    /// Renderer for the given currency and time zone.
    pub fn new(currency: &'static Currency, time_zone: TimeZone) -> Self {
        Self {
            currency,
            time_zone,
        }
    }

    /// Renderer for an ISO currency code such as `EUR`, if known.
    pub fn for_currency_code(code: &str, time_zone: TimeZone) -> Option<Self> {
        iso::find(&code.to_ascii_uppercase()).map(|currency| Self::new(currency, time_zone))
    }

    /// `YYYY-MM-DD` in the renderer's time zone.
    pub fn format_date(&self, timestamp: Timestamp) -> String {
        timestamp
            .to_zoned(self.time_zone.clone())
            .date()
            .to_string()
    }

    /// Price with currency symbol and minor-unit precision, in the currency's
    /// locale.
    pub fn format_price(&self, price: Decimal) -> String {
        Money::from_decimal(price, self.currency).to_string()
    }

    /// Standalone HTML page for one record.
    pub fn client_card(&self, record: &Record) -> String {
        let body = format!(
            concat!(
                "<div style=\"font-family:Arial; padding:18px;\">\n",
                "  <h2 style=\"margin:0 0 12px;\">Client card</h2>\n",
                "  <div><b>Date:</b> {date}</div>\n",
                "  <div><b>Name:</b> {name}</div>\n",
                "  <div><b>Phone:</b> <a href=\"tel:{dial}\">{phone}</a></div>\n",
                "  <div><b>Price:</b> {price}</div>\n",
                "  <div><b>Car:</b> {car}</div>\n",
                "  <div><b>Reg:</b> {reg}</div>\n",
                "</div>",
            ),
            date = escape_html(&self.format_date(record.created_at)),
            name = escape_html(&record.name),
            phone = escape_html(&record.phone),
            dial = escape_html(&dial_number(&record.phone)),
            price = escape_html(&self.format_price(record.price)),
            car = escape_html(&record.car),
            reg = escape_html(&record.reg),
        );

        document("Client PDF", &body)
    }

    /// Standalone HTML page listing every record.
    pub fn client_report(&self, records: &[Record]) -> String {
        let rows: String = records
            .iter()
            .map(|record| {
                format!(
                    "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape_html(&self.format_date(record.created_at)),
                    escape_html(&record.name),
                    escape_html(&record.phone),
                    escape_html(&self.format_price(record.price)),
                    escape_html(&record.car),
                    escape_html(&record.reg),
                )
            })
            .collect();

        let body = format!(
            concat!(
                "<div style=\"font-family:Arial; padding:18px;\">\n",
                "  <h2 style=\"margin:0 0 12px;\">Clients ({count})</h2>\n",
                "  <table border=\"1\" cellspacing=\"0\" cellpadding=\"6\">\n",
                "    <tr><th>Date</th><th>Name</th><th>Phone</th><th>Price</th><th>Car</th><th>Reg</th></tr>\n",
                "{rows}",
                "  </table>\n",
                "</div>",
            ),
            count = records.len(),
            rows = rows,
        );

        document("Clients PDF", &body)
    }

    /// Terminal table of records.
    pub fn records_table<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Date", "Name", "Phone", "Price", "Car", "Reg", "Id"]);

        for record in records {
            builder.push_record([
                self.format_date(record.created_at),
                record.name.clone(),
                record.phone.clone(),
                self.format_price(record.price),
                record.car.clone(),
                record.reg.clone(),
                record.id.to_string(),
            ]);
        }

        builder.build().with(Style::rounded()).to_string()
    }
}

/// Phone number reduced to digits and `+`, for `tel:` links.
pub fn dial_number(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '+')
        .collect()
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{body}</body></html>",
        escape_html(title)
    )
}
