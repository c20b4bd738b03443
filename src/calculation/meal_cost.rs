//! Meal-cost resolution.
//!
//! The cost of the meals an employee ordered during the payroll window is
//! deducted from their salary as a fixed-value "Meal Consumption" line.

use rust_decimal::Decimal;

use crate::error::PayrollResult;
use crate::models::{DateRange, Order};
use crate::repository::PayrollRepository;

/// Sums the prices of `employee_id`'s orders placed within `range`.
///
/// Orders of other employees or outside the range are ignored. No matching
/// orders yields zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::sum_meal_cost;
/// use payroll_engine::models::{DateRange, Order};
/// use rust_decimal::Decimal;
///
/// let range = DateRange::new(
///     "2026-01-01T00:00:00Z".parse().unwrap(),
///     "2026-01-31T23:59:59Z".parse().unwrap(),
/// )
/// .unwrap();
/// let orders = vec![Order {
///     id: "ord_1".to_string(),
///     organization_id: "org_acme".to_string(),
///     employee_id: "emp_001".to_string(),
///     placed_at: "2026-01-12T12:30:00Z".parse().unwrap(),
///     price: Decimal::new(450, 0),
/// }];
///
/// assert_eq!(sum_meal_cost("emp_001", &orders, &range), Decimal::new(450, 0));
/// assert_eq!(sum_meal_cost("emp_002", &orders, &range), Decimal::ZERO);
/// ```
pub fn sum_meal_cost(employee_id: &str, orders: &[Order], range: &DateRange) -> Decimal {
    orders
        .iter()
        .filter(|order| order.employee_id == employee_id && range.contains(order.placed_at))
        .map(|order| order.price)
        .sum()
}

/// Loads an employee's orders for the window and sums them.
///
/// An employee without orders costs zero. Repository failures propagate.
pub async fn resolve_meal_cost(
    repository: &dyn PayrollRepository,
    organization_id: &str,
    employee_id: &str,
    range: &DateRange,
) -> PayrollResult<Decimal> {
    let orders = repository
        .orders_for_employee(organization_id, employee_id, range)
        .await?;
    let cost = sum_meal_cost(employee_id, &orders, range);

    tracing::debug!(
        organization_id,
        employee_id,
        order_count = orders.len(),
        meal_cost = %cost,
        "Resolved meal cost"
    );

    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, Organization};
    use crate::repository::{InMemoryRepository, RepositorySeed};
    use chrono::{DateTime, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(
            instant("2026-01-01T00:00:00Z"),
            instant("2026-01-31T23:59:59Z"),
        )
        .unwrap()
    }

    fn order(id: &str, employee_id: &str, at: &str, price: &str) -> Order {
        Order {
            id: id.to_string(),
            organization_id: "org_acme".to_string(),
            employee_id: employee_id.to_string(),
            placed_at: instant(at),
            price: dec(price),
        }
    }

    /// MC-001: zero orders cost nothing
    #[test]
    fn test_mc_001_no_orders_is_zero() {
        assert_eq!(sum_meal_cost("emp_001", &[], &january()), dec("0"));
    }

    /// MC-002: range bounds are inclusive
    #[test]
    fn test_mc_002_inclusive_bounds() {
        let orders = vec![
            order("ord_1", "emp_001", "2026-01-01T00:00:00Z", "300"),
            order("ord_2", "emp_001", "2026-01-31T23:59:59Z", "450.50"),
            order("ord_3", "emp_001", "2026-02-01T00:00:00Z", "999"),
            order("ord_4", "emp_001", "2025-12-31T23:59:59Z", "999"),
        ];
        assert_eq!(sum_meal_cost("emp_001", &orders, &january()), dec("750.50"));
    }

    /// MC-003: other employees' orders are ignored
    #[test]
    fn test_mc_003_other_employees_ignored() {
        let orders = vec![
            order("ord_1", "emp_001", "2026-01-10T12:00:00Z", "300"),
            order("ord_2", "emp_002", "2026-01-10T12:00:00Z", "500"),
        ];
        assert_eq!(sum_meal_cost("emp_001", &orders, &january()), dec("300"));
    }

    #[tokio::test]
    async fn test_resolve_uses_repository_orders() {
        let repository = InMemoryRepository::from_seeds(vec![RepositorySeed {
            organization: Organization {
                id: "org_acme".to_string(),
                name: "Acme".to_string(),
            },
            employees: vec![Employee {
                id: "emp_001".to_string(),
                organization_id: "org_acme".to_string(),
                name: "Nimal Perera".to_string(),
                designation: None,
                basic_salary: dec("50000"),
            }],
            salary_adjustments: vec![],
            individual_adjustments: vec![],
            tax_slabs: vec![],
            orders: vec![
                order("ord_1", "emp_001", "2026-01-05T12:00:00Z", "400"),
                order("ord_2", "emp_001", "2026-01-06T12:00:00Z", "425"),
            ],
        }]);

        let cost = resolve_meal_cost(&repository, "org_acme", "emp_001", &january())
            .await
            .unwrap();
        assert_eq!(cost, dec("825"));

        let none = resolve_meal_cost(&repository, "org_acme", "emp_404", &january())
            .await
            .unwrap();
        assert_eq!(none, dec("0"));
    }
}
