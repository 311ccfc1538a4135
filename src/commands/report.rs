//! The report command: loads a snapshot of the ledger and renders one of the aggregations.

use crate::args::{ReportArgs, ReportKind};
use crate::commands::{now, plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::report::{
    self, daily_activity, day_report, expense_breakdown, income_breakdown, period_totals,
    time_series, top_products, weekly_comparison, AggregateReport, DailyActivity, DayReport,
    ExpenseTotal, IncomeTotal, Period, PeriodTotals, ProductQuantity, SeriesOrder, SeriesPoint,
    WeeklyComparison,
};
use crate::{Config, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

/// The structured result of a report, shaped by the requested `ReportKind`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportData {
    Summary(PeriodTotals),
    Expenses(Vec<ExpenseTotal>),
    Income(Vec<IncomeTotal>),
    Series(Vec<SeriesPoint>),
    Weekly(WeeklyComparison),
    Top(Vec<ProductQuantity>),
    Activity(DailyActivity),
    Today(DayReport),
    All(Box<AggregateReport>),
}

/// Computes a report.
///
/// The period runs from `--from` to `--to`, both defaulting to the day of `--as-of` (now, unless
/// given). A period that ends before it starts is empty and every total in it is zero. The weekly
/// comparison and the activity histogram are always relative to `--as-of` and ignore the period.
pub async fn report(config: Config, args: ReportArgs) -> Result<Out<ReportData>> {
    let as_of = args.as_of().unwrap_or_else(now);
    let today = as_of.date();
    let period = Period::new(
        args.from().unwrap_or(today),
        args.to().unwrap_or(today),
    );
    if period.is_empty() {
        warn!("The period {period} ends before it starts, every total will be zero");
    }
    let order = if args.chronological() {
        SeriesOrder::Chronological
    } else {
        SeriesOrder::FirstSeen
    };

    let snapshot = config
        .db()
        .load_snapshot()
        .await
        .pub_result(ErrorType::Database)?;
    if snapshot.skipped() > 0 {
        warn!(
            "{} left out of the report because they are malformed",
            plural(snapshot.skipped(), "record was", "records were")
        );
    }
    debug!("Computing {} report for {period} as of {as_of}", args.kind());

    let header = format!("{} | {}", config.business_name(), period);
    let (body, data) = match args.kind() {
        ReportKind::Summary => {
            let totals = period_totals(&snapshot, &period);
            (render_totals(&config, &totals), ReportData::Summary(totals))
        }
        ReportKind::Expenses => {
            let expenses = expense_breakdown(&snapshot, &period);
            (render_expenses(&config, &expenses), ReportData::Expenses(expenses))
        }
        ReportKind::Income => {
            let income = income_breakdown(&snapshot, &period);
            (render_income(&config, &income), ReportData::Income(income))
        }
        ReportKind::Series => {
            let series = time_series(&snapshot, &period, order);
            (render_series(&config, &series), ReportData::Series(series))
        }
        ReportKind::Weekly => {
            let weekly = weekly_comparison(&snapshot, as_of);
            (render_weekly(&config, &weekly), ReportData::Weekly(weekly))
        }
        ReportKind::Top => {
            let top = top_products(&snapshot, &period);
            (render_top(&top), ReportData::Top(top))
        }
        ReportKind::Activity => {
            let activity = daily_activity(&snapshot, today);
            (render_activity(&config, &activity), ReportData::Activity(activity))
        }
        ReportKind::Today => {
            let day = day_report(&snapshot, &Period::day(today));
            (render_day(&config, &day), ReportData::Today(day))
        }
        ReportKind::All => {
            let all = report::build(&snapshot, period, as_of, order);
            let body = [
                render_totals(&config, &all.totals),
                render_expenses(&config, &all.expenses_by_category),
                render_income(&config, &all.income_by_category),
                render_series(&config, &all.series),
                render_weekly(&config, &all.weekly),
                render_top(&all.top_products),
                render_activity(&config, &all.activity),
            ]
            .join("\n\n");
            (body, ReportData::All(Box::new(all)))
        }
    };

    Ok(Out::new(format!("{header}\n{body}"), data))
}

fn render_totals(config: &Config, totals: &PeriodTotals) -> String {
    format!(
        "Sales:    {:>14}\nExpenses: {:>14}\nBalance:  {:>14}",
        config.money(totals.sales),
        config.money(totals.expenses),
        config.money(totals.balance)
    )
}

fn render_expenses(config: &Config, expenses: &[ExpenseTotal]) -> String {
    let mut lines = vec!["Expenses by category".to_string()];
    for e in expenses {
        lines.push(format!(
            "  {:<26} {:>14}",
            e.category.to_string(),
            config.money(e.total)
        ));
    }
    lines.join("\n")
}

fn render_income(config: &Config, income: &[IncomeTotal]) -> String {
    let mut lines = vec!["Income by product category".to_string()];
    if income.is_empty() {
        lines.push("  No itemized sales".to_string());
    }
    for i in income {
        lines.push(format!(
            "  {:<26} {:>14}",
            i.bucket.to_string(),
            config.money(i.total)
        ));
    }
    lines.join("\n")
}

fn render_series(config: &Config, series: &[SeriesPoint]) -> String {
    let mut lines = vec![format!(
        "  {:<6} {:>14} {:>14} {:>14}",
        "Day", "Income", "Expense", "Balance"
    )];
    for p in series {
        lines.push(format!(
            "  {:<6} {:>14} {:>14} {:>14}",
            p.label,
            config.money(p.income),
            config.money(p.expense),
            config.money(p.balance)
        ));
    }
    lines.join("\n")
}

fn render_weekly(config: &Config, weekly: &WeeklyComparison) -> String {
    let change = weekly
        .percentage_change
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let sign = if change > Decimal::ZERO { "+" } else { "" };
    format!(
        "This week: {}\nLast week: {}\nChange:    {sign}{change}%",
        config.money(weekly.this_week),
        config.money(weekly.last_week)
    )
}

fn render_top(top: &[ProductQuantity]) -> String {
    let mut lines = vec!["Top products".to_string()];
    if top.is_empty() {
        lines.push("  No itemized sales".to_string());
    }
    for (rank, p) in top.iter().enumerate() {
        lines.push(format!("  {}. {:<24} {:>6}", rank + 1, p.name, p.quantity));
    }
    lines.join("\n")
}

fn render_activity(config: &Config, activity: &DailyActivity) -> String {
    const WIDTH: u32 = 20;
    let mut lines = vec!["Last 7 days".to_string()];
    for day in &activity.days {
        let filled = (day.fraction * Decimal::from(WIDTH))
            .round()
            .to_usize()
            .unwrap_or_default();
        lines.push(format!(
            "  {} {:<10} {:<20} {:>14} {:>14}",
            day.weekday,
            day.date.format("%d/%m"),
            "#".repeat(filled),
            config.money(day.sales),
            config.money(day.expenses)
        ));
    }
    lines.join("\n")
}

fn render_day(config: &Config, day: &DayReport) -> String {
    let mut lines = vec![render_totals(config, &day.totals)];
    if day.transactions.is_empty() {
        lines.push("No transactions".to_string());
    }
    for t in &day.transactions {
        lines.push(format!(
            "  {} {:<8} {:>14}  {}",
            t.date().format("%H:%M"),
            t.kind().to_string(),
            config.money(t.amount()),
            t.label()
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_timestamp, ExpenseCategory};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn scenario() -> TestEnv {
        let env = TestEnv::with_catalog().await;
        env.sale("2024-03-01 09:00", &[("prod1", 1)]).await;
        env.expense("2024-03-01 10:00", 20, ExpenseCategory::Utilities)
            .await;
        env
    }

    #[tokio::test]
    async fn test_summary_for_one_day() {
        let env = scenario().await;
        let args = ReportArgs::new(ReportKind::Summary)
            .with_period(date("2024-03-01"), date("2024-03-01"));
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Summary(totals) = out.structure().unwrap() else {
            panic!("expected a summary")
        };
        assert_eq!(totals.sales.value(), Decimal::from(45));
        assert_eq!(totals.expenses.value(), Decimal::from(20));
        assert_eq!(totals.balance.value(), Decimal::from(25));
        assert!(out.message().starts_with("Test Shop | 2024-03-01"));
        assert!(out.message().contains("S/ 25.00"));
    }

    #[tokio::test]
    async fn test_reversed_period_is_zero() {
        let env = scenario().await;
        let args = ReportArgs::new(ReportKind::Summary)
            .with_period(date("2024-03-02"), date("2024-03-01"));
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Summary(totals) = out.structure().unwrap() else {
            panic!("expected a summary")
        };
        assert_eq!(*totals, PeriodTotals::default());
    }

    #[tokio::test]
    async fn test_expense_breakdown_sums_to_total() {
        let env = scenario().await;
        env.expense("2024-03-01 11:00", 7, ExpenseCategory::SuppliesPackaging)
            .await;
        let args = ReportArgs::new(ReportKind::Expenses)
            .with_period(date("2024-03-01"), date("2024-03-31"));
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Expenses(expenses) = out.structure().unwrap() else {
            panic!("expected expenses")
        };
        assert_eq!(expenses.len(), 6);
        let sum: Decimal = expenses.iter().map(|e| e.total.value()).sum();
        assert_eq!(sum, Decimal::from(27));
        assert!(out.message().contains("Servicios Públicos"));
    }

    #[tokio::test]
    async fn test_today_defaults_to_as_of() {
        let env = scenario().await;
        let args = ReportArgs::new(ReportKind::Today)
            .with_as_of(parse_timestamp("2024-03-01 21:00").unwrap());
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Today(day) = out.structure().unwrap() else {
            panic!("expected a day report")
        };
        assert_eq!(day.transactions.len(), 2);
        assert!(day.transactions[0].is_expense());
        assert!(out.message().contains("Torta Chocolate"));
    }

    #[tokio::test]
    async fn test_series_chronological() {
        let env = TestEnv::with_catalog().await;
        env.sale("2024-03-02 09:00", &[("prod5", 1)]).await;
        env.sale("2024-03-01 09:00", &[("prod5", 2)]).await;
        let args = ReportArgs::new(ReportKind::Series)
            .with_period(date("2024-03-01"), date("2024-03-31"))
            .with_chronological(true);
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Series(series) = out.structure().unwrap() else {
            panic!("expected a series")
        };
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1/3", "2/3"]);
        assert_eq!(series[1].balance.value(), Decimal::from(45));
    }

    #[tokio::test]
    async fn test_series_first_seen_is_newest_first() {
        let env = TestEnv::with_catalog().await;
        env.sale("2024-03-01 09:00", &[("prod5", 2)]).await;
        env.sale("2024-03-02 09:00", &[("prod5", 1)]).await;
        let args = ReportArgs::new(ReportKind::Series)
            .with_period(date("2024-03-01"), date("2024-03-31"));
        let out = report(env.config(), args).await.unwrap();
        let ReportData::Series(series) = out.structure().unwrap() else {
            panic!("expected a series")
        };
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2/3", "1/3"]);
    }

    #[tokio::test]
    async fn test_all() {
        let env = scenario().await;
        env.sale("2024-03-01 12:00", &[("prod5", 3), ("prod1", 1)])
            .await;
        let args = ReportArgs::new(ReportKind::All)
            .with_period(date("2024-03-01"), date("2024-03-01"))
            .with_as_of(parse_timestamp("2024-03-01 21:00").unwrap());
        let out = report(env.config(), args).await.unwrap();
        let ReportData::All(all) = out.structure().unwrap() else {
            panic!("expected the full report")
        };
        assert_eq!(all.totals.sales.value(), Decimal::from(135));
        assert_eq!(all.top_products[0].name, "Pan dulce");
        assert_eq!(all.top_products[0].quantity, 3);
        assert_eq!(all.top_products[1].name, "Torta Chocolate");
        assert_eq!(all.weekly.this_week.value(), Decimal::from(135));
        assert_eq!(all.weekly.percentage_change, Decimal::ONE_HUNDRED);
        assert_eq!(all.activity.days[6].date, date("2024-03-01"));
        assert_eq!(all.income_by_category.len(), 1);
        assert!(out.message().contains("Sin Categoría"));
        assert!(out.message().contains("+100"));
    }

    #[test]
    fn test_report_data_json_is_untagged() {
        let data = ReportData::Summary(PeriodTotals::default());
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("sales").is_some());
    }
}
