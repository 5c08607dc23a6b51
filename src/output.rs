// Output rendering for CLI results (JSON or aligned text)

use clap::ValueEnum;
use qrcode::QrCode;
use serde::Serialize;

use crate::auth::Token;
use crate::models::{AllRates, Bank, Limits, Rates, Recipient, Transfer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Plain-text rendering of a result
pub trait TextRender {
    fn render_text(&self) -> String;
}

/// Render `value` in the requested format
pub fn render<T: Serialize + TextRender + ?Sized>(
    value: &T,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Text => Ok(value.render_text()),
    }
}

/// Left-aligned table with a dashed header rule
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    push_row(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
    for row in rows {
        push_row(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn key_values(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{:<width$}  {}\n", k, v, width = width))
        .collect()
}

impl TextRender for Rates {
    fn render_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .iter()
            .map(|(pair, rate)| vec![pair.clone(), rate.clone()])
            .collect();
        table(&["PAIR", "RATE"], &rows)
    }
}

impl TextRender for AllRates {
    fn render_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .btc
            .iter()
            .map(|(pair, rate)| vec!["BTC".to_string(), pair.clone(), rate.clone()])
            .chain(
                self.fx
                    .iter()
                    .map(|(pair, rate)| vec!["FX".to_string(), pair.clone(), rate.clone()]),
            )
            .collect();
        table(&["MARKET", "PAIR", "RATE"], &rows)
    }
}

impl TextRender for [Bank] {
    fn render_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.number.clone(),
                    b.display_name.clone(),
                    b.name.clone(),
                    b.name_ko.clone(),
                ]
            })
            .collect();
        table(&["ID", "NUMBER", "DISPLAY NAME", "NAME", "NAME (KO)"], &rows)
    }
}

impl TextRender for [Recipient] {
    fn render_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.name.clone(),
                    r.email.clone(),
                    r.bank.bank.display_name.clone(),
                    r.bank.account_number.clone(),
                    r.bank.account_name.clone(),
                ]
            })
            .collect();
        table(
            &["ID", "NAME", "EMAIL", "BANK", "ACCOUNT", "ACCOUNT NAME"],
            &rows,
        )
    }
}

impl TextRender for [Transfer] {
    fn render_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.date.clone(),
                    t.status.clone(),
                    format!("{} {}", t.amount, t.currency).trim().to_string(),
                    t.recipient.recipient.name.clone(),
                    t.memo.clone(),
                ]
            })
            .collect();
        table(
            &["ID", "DATE", "STATUS", "AMOUNT", "RECIPIENT", "MEMO"],
            &rows,
        )
    }
}

impl TextRender for Vec<Bank> {
    fn render_text(&self) -> String {
        self.as_slice().render_text()
    }
}

impl TextRender for Vec<Recipient> {
    fn render_text(&self) -> String {
        self.as_slice().render_text()
    }
}

impl TextRender for Vec<Transfer> {
    fn render_text(&self) -> String {
        self.as_slice().render_text()
    }
}

impl TextRender for Transfer {
    fn render_text(&self) -> String {
        let mut pairs = vec![
            ("ID", self.id.clone()),
            ("Type", self.kind.clone()),
            ("Status", self.status.clone()),
            ("Date", self.date.clone()),
            ("Amount", format!("{} {}", self.amount, self.currency)),
            (
                "Sender pays",
                format!("{} {}", self.sender.amount, self.sender.currency),
            ),
            (
                "Recipient",
                format!(
                    "{} ({}, {} {})",
                    self.recipient.recipient.name,
                    self.recipient.recipient.bank.bank.display_name,
                    self.recipient.recipient.bank.account_number,
                    self.recipient.recipient.bank.account_name
                ),
            ),
            (
                "Recipient gets",
                format!("{} {}", self.recipient.amount, self.recipient.currency),
            ),
            ("Memo", self.memo.clone()),
        ];
        if !self.btc.address.is_empty() {
            pairs.push(("BTC address", self.btc.address.clone()));
            pairs.push(("Payment link", self.btc.link.clone()));
            pairs.push(("Expires", format_expiration(self.btc.expiration)));
        }

        let mut out = key_values(&pairs);
        if !self.btc.address.is_empty() {
            let payload = if self.btc.link.is_empty() {
                &self.btc.address
            } else {
                &self.btc.link
            };
            if let Some(code) = payment_qr(payload) {
                out.push('\n');
                out.push_str(&code);
                out.push('\n');
            }
        }
        out
    }
}

/// Scannable QR code of a payment link, drawn with block characters
fn payment_qr(payload: &str) -> Option<String> {
    match QrCode::new(payload.as_bytes()) {
        Ok(code) => Some(
            code.render::<char>()
                .dark_color('█')
                .light_color(' ')
                .module_dimensions(2, 1)
                .build(),
        ),
        Err(e) => {
            tracing::warn!("Cannot render payment QR code: {}", e);
            None
        }
    }
}

impl TextRender for Limits {
    fn render_text(&self) -> String {
        let t = &self.transfers;
        let krw = &self.krw;
        let rows = vec![
            vec![
                "Pending transfers".to_string(),
                t.pending.total.used.to_string(),
                String::new(),
                t.pending.total.limit.to_string(),
            ],
            vec![
                "Completed transfers (daily)".to_string(),
                t.completed.daily.used.to_string(),
                String::new(),
                t.completed.daily.limit.to_string(),
            ],
            vec![
                "KRW (daily)".to_string(),
                krw.daily.used.clone(),
                krw.daily.left.clone(),
                krw.daily.limit.clone(),
            ],
            vec![
                "KRW (weekly)".to_string(),
                krw.weekly.used.clone(),
                krw.weekly.left.clone(),
                krw.weekly.limit.clone(),
            ],
        ];
        let mut out = table(&["LIMIT", "USED", "LEFT", "MAX"], &rows);
        out.push('\n');
        out.push_str(&key_values(&[
            ("KRW minimum", krw.min.clone()),
            ("BTC minimum", self.btc.min.clone()),
        ]));
        out
    }
}

impl TextRender for Token {
    fn render_text(&self) -> String {
        key_values(&[
            ("Token type", self.token_type.clone()),
            ("Expires in", format!("{}s", self.expires_in)),
            ("Valid until", self.valid_until.to_rfc3339()),
        ])
    }
}

fn format_expiration(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
