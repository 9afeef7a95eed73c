/// Years in which the viewer has any contribution history
pub fn contribution_years_query() -> String {
    r#"
        query {
            viewer {
                contributionsCollection {
                    contributionYears
                }
            }
        }
    "#
    .to_string()
}

/// Alias under which one year's collection is returned
pub fn year_alias(year: i32) -> String {
    format!("year{}", year)
}

fn year_contributions_body(year: i32) -> String {
    format!(
        r#"{alias}: contributionsCollection(
                    from: "{year}-01-01T00:00:00Z",
                    to: "{next}-01-01T00:00:00Z"
                ) {{
                    contributionCalendar {{
                        totalContributions
                    }}
                }}"#,
        alias = year_alias(year),
        year = year,
        next = year + 1,
    )
}

/// One calendar total per year, all in a single request
pub fn all_contributions_query(years: &[i32]) -> String {
    let each_year_queries: Vec<String> = years
        .iter()
        .map(|year| year_contributions_body(*year))
        .collect();

    format!(
        r#"
            query {{
                viewer {{
                    {}
                }}
            }}"#,
        each_year_queries.join("\n")
    )
}
