//! Calculations behind the household burden estimate.
//!
//! The two bracket-driven functions (employment-income deduction and
//! income-tax-due) are usable on their own; [`Estimator`] chains them with
//! the premium, resident-tax and consumption-tax steps.

pub mod common;
pub mod employment_deduction;
pub mod estimator;
pub mod income_tax;

pub use employment_deduction::EmploymentDeduction;
pub use estimator::{Estimate, Estimator, SocialInsurancePremiums};
pub use income_tax::{IncomeTax, IncomeTaxLiability};
