use sqlx::PgPool;
use thiserror::Error;

use crate::models::profile::{ProfileInput, StudentProfile};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("A profile already exists for this student")]
    AlreadyExists,
    #[error("Student profile not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Field-by-field validation, first failure wins. Returns a trimmed copy so
/// stored values never carry stray whitespace. The profile photo is required
/// too, but it travels as a separate upload and is checked at that boundary.
pub fn validate(input: &ProfileInput) -> Result<ProfileInput, &'static str> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err("Please enter your name");
    }
    if input.age <= 0 {
        return Err("Please enter a valid age");
    }
    let class_name = input.class_name.trim();
    if class_name.is_empty() {
        return Err("Please enter your class");
    }
    let school = input.school.trim();
    if school.is_empty() {
        return Err("Please enter your school name");
    }
    let batch = input.batch.trim();
    if batch.is_empty() {
        return Err("Please select a batch");
    }
    let tuition_center = input.tuition_center.trim();
    if tuition_center.is_empty() {
        return Err("Please enter the tuition center");
    }
    let parent_mobile_number = input.parent_mobile_number.trim();
    if parent_mobile_number.is_empty() {
        return Err("Please enter parent mobile number");
    }
    let date_of_birth = input.date_of_birth.trim();
    if date_of_birth.is_empty() {
        return Err("Please enter your date of birth");
    }

    let student_mobile_number = input
        .student_mobile_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ProfileInput {
        name: name.to_string(),
        age: input.age,
        class_name: class_name.to_string(),
        school: school.to_string(),
        batch: batch.to_string(),
        tuition_center: tuition_center.to_string(),
        parent_mobile_number: parent_mobile_number.to_string(),
        date_of_birth: date_of_birth.to_string(),
        student_mobile_number,
    })
}

pub struct ProfileService;

impl ProfileService {
    pub async fn get(pool: &PgPool, principal: &str) -> Result<Option<StudentProfile>, ProfileError> {
        let row = sqlx::query_as::<_, StudentProfile>(
            "SELECT * FROM student_profiles WHERE principal = $1",
        )
        .bind(principal)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<StudentProfile>, ProfileError> {
        let rows = sqlx::query_as::<_, StudentProfile>(
            "SELECT * FROM student_profiles ORDER BY name",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        pool: &PgPool,
        principal: &str,
        input: &ProfileInput,
    ) -> Result<StudentProfile, ProfileError> {
        if Self::get(pool, principal).await?.is_some() {
            return Err(ProfileError::AlreadyExists);
        }

        let row = sqlx::query_as::<_, StudentProfile>(
            "INSERT INTO student_profiles
                (principal, name, age, class_name, school, batch, tuition_center,
                 parent_mobile_number, date_of_birth, student_mobile_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(principal)
        .bind(&input.name)
        .bind(input.age)
        .bind(&input.class_name)
        .bind(&input.school)
        .bind(&input.batch)
        .bind(&input.tuition_center)
        .bind(&input.parent_mobile_number)
        .bind(&input.date_of_birth)
        .bind(&input.student_mobile_number)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Full replace, matching the single-form edit surface.
    pub async fn update(
        pool: &PgPool,
        principal: &str,
        input: &ProfileInput,
    ) -> Result<StudentProfile, ProfileError> {
        let row = sqlx::query_as::<_, StudentProfile>(
            "UPDATE student_profiles
             SET name = $1, age = $2, class_name = $3, school = $4, batch = $5,
                 tuition_center = $6, parent_mobile_number = $7, date_of_birth = $8,
                 student_mobile_number = $9, updated_at = NOW()
             WHERE principal = $10
             RETURNING *",
        )
        .bind(&input.name)
        .bind(input.age)
        .bind(&input.class_name)
        .bind(&input.school)
        .bind(&input.batch)
        .bind(&input.tuition_center)
        .bind(&input.parent_mobile_number)
        .bind(&input.date_of_birth)
        .bind(&input.student_mobile_number)
        .bind(principal)
        .fetch_optional(pool)
        .await?;
        row.ok_or(ProfileError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> ProfileInput {
        ProfileInput {
            name: "  Asha Rao  ".into(),
            age: 15,
            class_name: "10th".into(),
            school: "City High".into(),
            batch: "Morning".into(),
            tuition_center: "Central Branch".into(),
            parent_mobile_number: "9876543210".into(),
            date_of_birth: "2010-04-12".into(),
            student_mobile_number: Some("  ".into()),
        }
    }

    #[test]
    fn valid_input_is_trimmed() {
        let out = validate(&full_input()).unwrap();
        assert_eq!(out.name, "Asha Rao");
        // Blank optional number collapses to None rather than an empty string.
        assert_eq!(out.student_mobile_number, None);
    }

    #[test]
    fn each_mandatory_field_is_enforced() {
        let mut input = full_input();
        input.name = " ".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter your name");

        let mut input = full_input();
        input.class_name = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter your class");

        let mut input = full_input();
        input.school = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter your school name");

        let mut input = full_input();
        input.batch = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please select a batch");

        let mut input = full_input();
        input.tuition_center = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter the tuition center");

        let mut input = full_input();
        input.parent_mobile_number = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter parent mobile number");

        let mut input = full_input();
        input.date_of_birth = "".into();
        assert_eq!(validate(&input).unwrap_err(), "Please enter your date of birth");
    }

    #[test]
    fn age_must_be_a_positive_integer() {
        let mut input = full_input();
        input.age = 0;
        assert_eq!(validate(&input).unwrap_err(), "Please enter a valid age");
        input.age = -3;
        assert_eq!(validate(&input).unwrap_err(), "Please enter a valid age");
    }

    #[test]
    fn secondary_mobile_number_is_optional() {
        let mut input = full_input();
        input.student_mobile_number = None;
        assert!(validate(&input).is_ok());
    }
}
