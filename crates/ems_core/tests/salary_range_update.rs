use ems_core::{
    ConnectionProvider, Employee, EmployeeRepository, RepoError, SalaryRange,
    SqliteConnectionProvider, SqliteEmployeeRepository,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn seed(repo: &SqliteEmployeeRepository<'_>, salaries: &[f64]) -> Vec<i64> {
    salaries
        .iter()
        .enumerate()
        .map(|(index, salary)| {
            let ssn = format!("{:09}", 100_000_000 + index);
            repo.save(&mut Employee::new(
                "Test", "Person", ssn, "Engineer", "Platform", *salary,
            ))
            .unwrap()
        })
        .collect()
}

fn salary_of(repo: &SqliteEmployeeRepository<'_>, id: i64) -> f64 {
    repo.find_by_id(id).unwrap().unwrap().salary
}

#[test]
fn raises_only_salaries_inside_half_open_range() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&provider);
    let ids = seed(&repo, &[75_000.0, 55_000.0]);

    let affected = repo
        .update_salary_by_range(&SalaryRange::new(60_000.0, 100_000.0, 10.0))
        .unwrap();

    assert_eq!(affected, 1);
    assert_close(salary_of(&repo, ids[0]), 82_500.0);
    assert_close(salary_of(&repo, ids[1]), 55_000.0);
}

#[test]
fn lower_bound_is_inclusive_and_upper_bound_exclusive() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&provider);
    let ids = seed(&repo, &[60_000.0, 100_000.0]);

    let affected = repo
        .update_salary_by_range(&SalaryRange::new(60_000.0, 100_000.0, 5.0))
        .unwrap();

    assert_eq!(affected, 1);
    assert_close(salary_of(&repo, ids[0]), 63_000.0);
    assert_close(salary_of(&repo, ids[1]), 100_000.0);
}

#[test]
fn store_result_matches_in_process_calculation() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&provider);
    let ids = seed(&repo, &[75_000.0, 95_000.0]);
    let range = SalaryRange::new(50_000.0, 100_000.0, 3.2);

    repo.update_salary_by_range(&range).unwrap();

    assert_close(salary_of(&repo, ids[0]), range.calculate_new_salary(75_000.0));
    assert_close(salary_of(&repo, ids[1]), range.calculate_new_salary(95_000.0));
}

#[test]
fn empty_range_succeeds_with_zero_count() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&provider);
    let ids = seed(&repo, &[40_000.0]);

    let affected = repo
        .update_salary_by_range(&SalaryRange::new(200_000.0, 300_000.0, 10.0))
        .unwrap();

    assert_eq!(affected, 0);
    assert_close(salary_of(&repo, ids[0]), 40_000.0);
}

#[test]
fn failure_mid_update_rolls_back_every_row() {
    let provider = SqliteConnectionProvider::in_memory().unwrap();
    let repo = SqliteEmployeeRepository::new(&provider);
    let ids = seed(&repo, &[70_000.0, 80_000.0, 90_000.0]);

    provider
        .acquire()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER employee_salary_cap
             BEFORE UPDATE OF salary ON employee
             WHEN NEW.salary > 95000
             BEGIN
                 SELECT RAISE(ABORT, 'salary cap exceeded');
             END;",
        )
        .unwrap();

    let result = repo.update_salary_by_range(&SalaryRange::new(60_000.0, 100_000.0, 10.0));
    assert!(matches!(result, Err(RepoError::Db(_))));

    assert_close(salary_of(&repo, ids[0]), 70_000.0);
    assert_close(salary_of(&repo, ids[1]), 80_000.0);
    assert_close(salary_of(&repo, ids[2]), 90_000.0);

    // The store stays usable for later writes.
    let affected = repo
        .update_salary_by_range(&SalaryRange::new(60_000.0, 75_000.0, 10.0))
        .unwrap();
    assert_eq!(affected, 1);
    assert_close(salary_of(&repo, ids[0]), 77_000.0);
}
