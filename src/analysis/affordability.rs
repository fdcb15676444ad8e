use log::warn;
use serde::Serialize;

use crate::domain::{AnnualPriceSalary, IncomeGroup};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordabilityRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Real_House_Price")]
    pub real_house_price: f64,
    #[serde(rename = "Real_Median_Salary")]
    pub real_median_salary: f64,
    #[serde(rename = "Affordability_Ratio")]
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeAffordabilityRow {
    #[serde(rename = "Age_Group")]
    pub age_group: String,
    #[serde(rename = "Median_Salary")]
    pub median_salary: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Years_of_Income_to_Buy")]
    pub years_of_income: f64,
}

/// `Real_House_Price / Real_Median_Salary` for every year that has both.
///
/// Years without a salary, or with a non-positive one, are skipped.
pub fn affordability_ratios(data: &[AnnualPriceSalary]) -> Result<Vec<AffordabilityRow>, AppError> {
    let mut rows = Vec::with_capacity(data.len());
    let mut skipped = 0usize;

    for d in data {
        match d.real_median_salary {
            Some(salary) if salary > 0.0 => rows.push(AffordabilityRow {
                year: d.year,
                real_house_price: d.real_house_price,
                real_median_salary: salary,
                ratio: d.real_house_price / salary,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("affordability: {skipped} years without a usable salary skipped");
    }
    if rows.is_empty() {
        return Err(AppError::new(
            ErrorKind::EmptyData,
            "No year has both a real house price and a real median salary.",
        ));
    }
    rows.sort_by_key(|r| r.year);
    Ok(rows)
}

/// Real house price of the most recent year.
pub fn latest_real_price(data: &[AnnualPriceSalary]) -> Result<AnnualPriceSalary, AppError> {
    data.iter()
        .copied()
        .max_by_key(|d| d.year)
        .ok_or_else(|| AppError::new(ErrorKind::EmptyData, "Real house price dataset is empty."))
}

/// Years of median salary needed to buy a house at `house_price`, per group.
pub fn affordability_by_age(groups: &[IncomeGroup], house_price: f64) -> Result<Vec<AgeAffordabilityRow>, AppError> {
    let rows: Vec<AgeAffordabilityRow> = groups
        .iter()
        .filter(|g| g.median_salary > 0.0)
        .map(|g| AgeAffordabilityRow {
            age_group: g.age_group.clone(),
            median_salary: g.median_salary,
            gender: g.gender.clone(),
            years_of_income: house_price / g.median_salary,
        })
        .collect();

    if rows.is_empty() {
        return Err(AppError::new(ErrorKind::EmptyData, "No income group has a usable median salary."));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(year: i32, price: f64, salary: Option<f64>) -> AnnualPriceSalary {
        AnnualPriceSalary {
            year,
            real_house_price: price,
            real_median_salary: salary,
        }
    }

    #[test]
    fn ratio_is_price_over_salary() {
        let rows = affordability_ratios(&[year(2001, 300_000.0, Some(30_000.0)), year(2000, 100.0, None)]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2001);
        assert_eq!(rows[0].ratio, 10.0);
    }

    #[test]
    fn no_salary_anywhere_is_empty_data() {
        let err = affordability_ratios(&[year(2000, 1.0, None)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyData);
    }

    #[test]
    fn by_age_uses_latest_year() {
        let data = [year(2019, 200_000.0, None), year(2021, 250_000.0, Some(1.0)), year(2020, 1.0, None)];
        let latest = latest_real_price(&data).unwrap();
        assert_eq!(latest.year, 2021);

        let groups = vec![
            IncomeGroup {
                age_group: "22-29".into(),
                median_salary: 25_000.0,
                gender: "Male".into(),
            },
            IncomeGroup {
                age_group: "30-39".into(),
                median_salary: 50_000.0,
                gender: "Female".into(),
            },
        ];
        let rows = affordability_by_age(&groups, latest.real_house_price).unwrap();
        assert_eq!(rows[0].years_of_income, 10.0);
        assert_eq!(rows[1].years_of_income, 5.0);
        assert_eq!(rows[1].gender, "Female");

        assert!(latest_real_price(&[]).is_err());
    }
}
