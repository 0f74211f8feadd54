use crate::error::{Error, Result};
use crate::models::user::Role;
use uuid::Uuid;

/// Authenticated caller identity, extracted from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageUsers,
    ManageCourses,
    ManageClasses,
    ManageLessons,
    ManageActivities,
    ManageQuestions,
    GradeAttempts,
    ManageAchievements,
    AwardAchievements,
    ViewPublishedContent,
    StartAttempt,
    ViewStats,
}

/// Single authorization entry point, evaluated in services before any mutation.
///
/// `owners` carries the user ids allowed to touch the resource (course
/// methodist, class teacher, ...). An empty slice means the action has no
/// ownership constraint. Admins bypass both checks.
pub fn authorize(principal: &Principal, action: Action, owners: &[Uuid]) -> Result<()> {
    if principal.role == Role::Admin {
        return Ok(());
    }
    if !role_allows(principal.role, action) {
        return Err(Error::Forbidden(format!(
            "Role '{}' is not permitted to perform this action",
            principal.role.as_str()
        )));
    }
    if !owners.is_empty() && !owners.contains(&principal.id) {
        return Err(Error::Forbidden(
            "You do not own this resource".to_string(),
        ));
    }
    Ok(())
}

fn role_allows(role: Role, action: Action) -> bool {
    use Action::*;
    match role {
        Role::Admin => true,
        Role::Methodist => matches!(
            action,
            ManageCourses
                | ManageClasses
                | ManageLessons
                | ManageActivities
                | ManageQuestions
                | GradeAttempts
                | ManageAchievements
                | AwardAchievements
                | ViewPublishedContent
                | ViewStats
        ),
        Role::Teacher => matches!(
            action,
            ManageClasses
                | ManageActivities
                | ManageQuestions
                | GradeAttempts
                | AwardAchievements
                | ViewPublishedContent
                | ViewStats
        ),
        Role::Student => matches!(action, ViewPublishedContent | StartAttempt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn admin_bypasses_ownership() {
        let admin = principal(Role::Admin);
        assert!(authorize(&admin, Action::ManageCourses, &[Uuid::new_v4()]).is_ok());
    }

    #[test]
    fn student_cannot_manage_activities() {
        let student = principal(Role::Student);
        let err = authorize(&student, Action::ManageActivities, &[]).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn methodist_needs_ownership() {
        let methodist = principal(Role::Methodist);
        assert!(authorize(&methodist, Action::ManageCourses, &[methodist.id]).is_ok());
        let err = authorize(&methodist, Action::ManageCourses, &[Uuid::new_v4()]).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn teacher_may_grade_their_class() {
        let teacher = principal(Role::Teacher);
        assert!(authorize(&teacher, Action::GradeAttempts, &[teacher.id]).is_ok());
        assert!(authorize(&teacher, Action::ManageCourses, &[]).is_err());
    }
}
