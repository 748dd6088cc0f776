use std::fmt::Display;

use crate::gateway::status::{TransactionResponse, TransactionStatus};

const RULE: &str = "============================================================";

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Final summary block printed once polling settles
pub struct Summary<'a>(pub &'a TransactionResponse);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tx = self.0;
        let amount = tx
            .amount
            .map(|a| format!("{a:.0}"))
            .unwrap_or_else(|| "-".to_string());

        writeln!(f, "\n{RULE}")?;
        writeln!(f, "                 TRANSACTION FINAL STATUS")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Reference:           {}", field(&tx.reference))?;
        writeln!(f, "External Reference:  {}", field(&tx.external_reference))?;
        writeln!(f, "Status:              {}", tx.status)?;
        writeln!(f, "Amount:              {amount} {}", field(&tx.currency))?;
        writeln!(f, "Operator:            {}", field(&tx.operator))?;
        writeln!(f, "Description:         {}", field(&tx.description))?;
        writeln!(f, "Code:                {}", field(&tx.code))?;
        writeln!(f, "Operator Reference:  {}", field(&tx.operator_reference))?;
        writeln!(f, "{RULE}")?;

        match tx.normalized_status() {
            TransactionStatus::Successful => writeln!(f, "Payment successful!"),
            TransactionStatus::Failed => writeln!(f, "Payment failed"),
            _ => writeln!(f, "Unknown status: {}", tx.status),
        }
    }
}
