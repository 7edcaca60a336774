//! WhatsApp-style ledger statement formatting.

use std::fmt::Write as _;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use khata_shared::types::round_money;

use crate::customer::CustomerRef;
use crate::ledger::{EntryKind, Ledger};

/// Characters kept verbatim when URL-encoding the message body
/// (matches `encodeURIComponent` semantics).
const MESSAGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Formats a money amount with the rupee sign and Indian digit grouping
/// (last three digits, then groups of two: 12,34,567).
///
/// Whole amounts drop the fractional part; everything else keeps two
/// decimal places.
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    // Two decimal places first, so a long fraction can never overflow
    // the paise field (0.999 would otherwise round to 100 paise).
    let amount = round_money(amount.abs());
    let fractional = amount.fract();
    let whole = amount.trunc().to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 2);
    let digits: Vec<char> = whole.chars().collect();
    for (i, digit) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    if fractional.is_zero() {
        format!("\u{20b9}{grouped}")
    } else {
        // Two decimal places, e.g. ₹1,234.50
        let paise = (fractional * Decimal::ONE_HUNDRED)
            .round()
            .to_u32()
            .unwrap_or(0);
        format!("\u{20b9}{grouped}.{paise:02}")
    }
}

/// Renders a ledger statement as a WhatsApp-ready text message.
///
/// The given entries and closing balance are formatted as-is; positive
/// balances read "customer owes you", negative ones "you owe customer".
#[must_use]
pub fn format_statement(customer: &CustomerRef, ledger: &Ledger) -> String {
    let mut message = format!("*Ledger Statement for {}*\n\n", customer.name);
    let _ = writeln!(message, "Customer ID: {}", customer.code);
    if let Some(phone) = &customer.phone {
        let _ = writeln!(message, "Phone: {phone}");
    }

    let balance = ledger.closing_balance;
    let _ = write!(
        message,
        "\n*Current Balance: {}*\n",
        format_inr(balance)
    );
    if balance > Decimal::ZERO {
        message.push_str("(Customer owes you)\n");
    } else if balance < Decimal::ZERO {
        message.push_str("(You owe customer)\n");
    } else {
        message.push_str("(Settled)\n");
    }

    message.push_str("\n*Transaction History:*\n\n");

    if ledger.entries.is_empty() {
        message.push_str("No transactions found.\n");
    } else {
        for (index, entry) in ledger.entries.iter().enumerate() {
            let date = entry.date.format("%d %b %Y");
            match entry.kind {
                EntryKind::Invoice => {
                    let _ = writeln!(
                        message,
                        "{}. *Invoice* {}",
                        index + 1,
                        entry.reference.as_deref().unwrap_or("N/A")
                    );
                    let _ = writeln!(message, "   Date: {date}");
                    let _ = writeln!(message, "   Amount: {}", format_inr(entry.debit));
                }
                EntryKind::Payment => {
                    let _ = writeln!(message, "{}. *{}*", index + 1, entry.description);
                    let _ = writeln!(message, "   Date: {date}");
                    let _ = writeln!(message, "   Amount: {}", format_inr(entry.credit));
                }
            }
            let _ = writeln!(message, "   Balance: {}", format_inr(entry.balance));
            message.push('\n');
        }
    }

    message.push_str("\n_Generated by Khata_");
    message
}

/// Builds a `wa.me` share URL for a statement message.
///
/// Non-digit characters are stripped from the phone number; the message is
/// percent-encoded.
#[must_use]
pub fn wa_me_url(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let encoded = utf8_percent_encode(message, MESSAGE_ENCODE_SET);
    format!("https://wa.me/{digits}?text={encoded}")
}
