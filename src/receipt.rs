//! Receipt
//!
//! Renders the order summary shown before the customer places an order.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartError, CartLine},
    discounts::percent_points,
    menu::Customizations,
    pricing::OrderTotals,
    promotions::PromoCode,
};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Order summary: the cart lines followed by the totals.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    lines: &'a [CartLine],
    totals: OrderTotals,
    tax_rate: Percentage,
    promo: Option<&'a PromoCode>,
}

impl<'a> OrderSummary<'a> {
    /// Create a summary.
    pub fn new(
        lines: &'a [CartLine],
        totals: OrderTotals,
        tax_rate: Percentage,
        promo: Option<&'a PromoCode>,
    ) -> Self {
        Self {
            lines,
            totals,
            tax_rate,
            promo,
        }
    }

    /// Write the summary table and totals to `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total overflows or writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Total"]);

        for line in self.lines {
            builder.push_record([
                line_label(line),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.line_total()?.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_totals(&mut out)
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.totals;

        let mut rows: Vec<(String, String)> = vec![("Subtotal:".to_string(), totals.subtotal.to_string())];

        if let Some(promo) = self.promo {
            rows.push((
                format!("Discount ({} {}%):", promo.code(), percent_points(&promo.percent_off())),
                format!("-{}", totals.discount),
            ));
        }

        rows.push(("Delivery Fee:".to_string(), totals.delivery_fee.to_string()));
        rows.push((
            format!("Taxes ({}%):", percent_points(&self.tax_rate)),
            totals.taxes.to_string(),
        ));
        rows.push(("Total:".to_string(), totals.total.to_string()));

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// The item name, with its customizations on following lines.
fn line_label(line: &CartLine) -> String {
    let mut label = line.name().to_string();

    append_customizations(&mut label, line.customizations());

    label
}

fn append_customizations(label: &mut String, customizations: &Customizations) {
    for choice in customizations.choices() {
        _ = write!(label, "\n  {}: {}", choice.name, choice.value);
    }

    if let Some(instructions) = customizations.instructions() {
        _ = write!(label, "\n  \"{instructions}\"");
    }
}
