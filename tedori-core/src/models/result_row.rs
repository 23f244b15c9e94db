use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of a breakdown row. Chart renderers plot only [`RowGroup::Expense`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowGroup {
    Income,
    Expense,
    Total,
}

impl RowGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Total => "total",
        }
    }
}

/// Every line of the breakdown, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownItem {
    Income,
    IncomeTax,
    ResidentTax,
    Pension,
    HealthInsurance,
    UnemploymentInsurance,
    ConsumptionTax,
    Rent,
    Savings,
    Consumption,
    GrandTotal,
}

impl BreakdownItem {
    pub const ORDER: [Self; 11] = [
        Self::Income,
        Self::IncomeTax,
        Self::ResidentTax,
        Self::Pension,
        Self::HealthInsurance,
        Self::UnemploymentInsurance,
        Self::ConsumptionTax,
        Self::Rent,
        Self::Savings,
        Self::Consumption,
        Self::GrandTotal,
    ];

    pub fn group(&self) -> RowGroup {
        match self {
            Self::Income => RowGroup::Income,
            Self::GrandTotal => RowGroup::Total,
            _ => RowGroup::Expense,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "年収",
            Self::IncomeTax => "所得税",
            Self::ResidentTax => "住民税",
            Self::Pension => "厚生年金保険料",
            Self::HealthInsurance => "健康保険料",
            Self::UnemploymentInsurance => "雇用保険料",
            Self::ConsumptionTax => "消費税",
            Self::Rent => "家賃",
            Self::Savings => "貯蓄",
            Self::Consumption => "消費（税抜）",
            Self::GrandTotal => "税・社会保険料合計",
        }
    }

    /// True for rows that make up the total direct tax.
    pub fn is_direct_tax(&self) -> bool {
        matches!(
            self,
            Self::IncomeTax
                | Self::ResidentTax
                | Self::Pension
                | Self::HealthInsurance
                | Self::UnemploymentInsurance
        )
    }
}

/// A labelled amount and its share of income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub item: BreakdownItem,
    pub value: Decimal,
    pub ratio: Decimal,
}

impl ResultRow {
    pub fn group(&self) -> RowGroup {
        self.item.group()
    }

    pub fn label(&self) -> &'static str {
        self.item.label()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn order_starts_with_income_and_ends_with_total() {
        assert_eq!(BreakdownItem::ORDER[0].group(), RowGroup::Income);
        assert_eq!(BreakdownItem::ORDER[10].group(), RowGroup::Total);
        assert!(
            BreakdownItem::ORDER[1..10]
                .iter()
                .all(|item| item.group() == RowGroup::Expense)
        );
    }

    #[test]
    fn direct_tax_items_are_taxes_and_premiums() {
        let direct: Vec<_> = BreakdownItem::ORDER
            .iter()
            .filter(|item| item.is_direct_tax())
            .collect();

        assert_eq!(direct.len(), 5);
        assert!(!BreakdownItem::ConsumptionTax.is_direct_tax());
    }

    #[test]
    fn group_as_str_is_lowercase() {
        assert_eq!(RowGroup::Expense.as_str(), "expense");
    }
}
