//! The platform's route declarations.

use campusgate_core::{PLATFORM_ADMIN_LOGIN, Realm};

use crate::error::RouteError;
use crate::forced_action::FORCED_ACTION_PAGE;
use crate::route::{RouteFlags, RouteKind, RouteTable};

const LEARNER_SUFFIX: &str = " - Interdisciplinary PBL Platform";
const ADMIN_SUFFIX: &str = " - PBL Admin Console";
const TEACHER_SUFFIX: &str = " - PBL Teacher Portal";
const CHANNEL_SUFFIX: &str = " - PBL Channel Portal";

pub(crate) fn standard_routes() -> Result<RouteTable, RouteError> {
    let learner = RouteFlags::LEARNER;
    let admin = RouteFlags::realm(Realm::InstitutionAdmin);
    let teacher = RouteFlags::realm(Realm::Instructor);
    let channel = RouteFlags::realm(Realm::ChannelPartner);

    RouteTable::builder()
        // Learner
        .login(
            Realm::Learner.login_path(),
            "Login",
            &format!("Student Login{LEARNER_SUFFIX}"),
            Realm::Learner,
        )
        .route(
            FORCED_ACTION_PAGE,
            "ChangePassword",
            Some(&format!("Change Password{LEARNER_SUFFIX}")),
            RouteKind::ForcedAction,
            learner.skipping_forced_action(),
        )
        .redirect("/", "Home", RouteKind::Home(Realm::Learner), "/courses")
        .section("/", learner, LEARNER_SUFFIX, |s| {
            s.page("courses", "MyCourses", "My Courses")
                .page("course/:courseId", "CourseDetail", "Course Details")
                .page("projects", "Projects", "Project Practice")
                .page("project/:id", "ProjectDetail", "Project Details")
                .page("outputs", "Outputs", "Project Outputs")
                .page("portfolio", "Portfolio", "Learning Portfolio")
                .page("tasks/:id?", "Tasks", "Task List")
                .page("progress", "Progress", "Learning Progress")
                .bare_page("unit/:unitId", "UnitLearning", "Unit Learning", learner.without_sidebar())
                .page("profile", "Profile", "Profile")
                .page("my-tasks", "MyTasks", "My Submitted Tasks")
        })
        // Institution administrators
        .login(
            Realm::InstitutionAdmin.login_path(),
            "AdminLogin",
            &format!("Institution Admin Login{ADMIN_SUFFIX}"),
            Realm::InstitutionAdmin,
        )
        .login(
            PLATFORM_ADMIN_LOGIN,
            "PlatformAdminLogin",
            &format!("Platform Admin Login{ADMIN_SUFFIX}"),
            Realm::InstitutionAdmin,
        )
        .section("/admin", admin, ADMIN_SUFFIX, |s| {
            s.home("AdminHome", "Overview", Realm::InstitutionAdmin)
                .page("courses", "AdminCourses", "Course Management")
                .page("courses/:courseId", "AdminCourseDetail", "Course Details")
                .page("schools", "AdminSchools", "School Management")
                .page("school-courses", "AdminSchoolCourses", "School Course Configuration")
                .page("school-course-library", "SchoolCourseLibrary", "School Course Library")
                .page("course-templates", "CourseTemplates", "Course Template Management")
                .page("course-templates/:uuid", "CourseTemplateDetail", "Course Template Details")
                .page("template-permissions", "TemplatePermissions", "Course Template Authorization")
                .redirect(
                    "template-library",
                    "TemplateLibrary",
                    RouteKind::Page,
                    "/admin/template-permissions",
                )
                .page("available-templates", "AvailableTemplates", "Course Template Library")
                .page("template-detail/:uuid", "TemplateDetail", "Course Template Details")
                .page("units", "AdminUnits", "Learning Units")
                .page("resources", "AdminResources", "Resource Management")
                .page("video-permissions", "AdminVideoPermissions", "Video Permissions")
                .page("tasks", "AdminTasks", "Task Management")
                .page("projects", "AdminProjects", "Project Management")
                .page("users", "AdminUsers", "User Management")
                .page("school-user-management", "SchoolUserManagement", "User Management")
                .page("classes", "AdminClasses", "Project Course Management")
                .page("classes/:uuid", "ClassDetail", "Class Details")
                .page("classes/:uuid/edit", "ClassEdit", "Edit Class")
                .page("classes/:uuid/members", "ClassMembers", "Member Management")
                .page("classes/:uuid/courses", "ClassCourses", "Course Management")
                .page("classes/:uuid/groups", "ClassGroups", "Group Management")
                .page("classes/:uuid/teachers", "ClassTeachers", "Teacher Management")
                .page("classes/:uuid/progress", "ClassProgress", "Learning Progress")
                .page(
                    "classes/:classUuid/progress/units/:unitId",
                    "ClassUnitDetail",
                    "Unit Details",
                )
                .page("classes/:uuid/homework", "ClassHomework", "Homework Management")
                .page(
                    "classes/:uuid/homework/units/:unitId",
                    "ClassUnitHomework",
                    "Unit Homework",
                )
                .page("classes/:uuid/create-course", "ClassCreateCourse", "Create Course")
                .page("progress", "AdminProgress", "Learning Progress")
                .page("assessments", "AdminAssessments", "Assessment Management")
                .page("assessment-templates", "AdminAssessmentTemplates", "Assessment Templates")
                .page("outputs", "AdminOutputs", "Output Management")
                .page("portfolios", "AdminPortfolios", "Learning Portfolios")
                .page("datasets", "AdminDatasets", "Dataset Management")
                .page("ethics-cases", "AdminEthicsCases", "Ethics Cases")
                .page("ethics-activities", "AdminEthicsActivities", "Ethics Activities")
                .page("experts", "AdminExperts", "Expert Management")
                .page("social-activities", "AdminSocialActivities", "Social Activities")
        })
        // Instructors
        .login(
            Realm::Instructor.login_path(),
            "TeacherLogin",
            &format!("Teacher Login{TEACHER_SUFFIX}"),
            Realm::Instructor,
        )
        .section("/teacher", teacher, TEACHER_SUFFIX, |s| {
            s.redirect("", "TeacherHome", RouteKind::Home(Realm::Instructor), "/teacher/dashboard")
                .page("dashboard", "TeacherDashboard", "Dashboard")
                .page("courses", "TeacherCourses", "My Classes")
                .page("courses/:uuid", "TeacherCourseDetail", "Course Details")
                .page("courses/:uuid/members", "TeacherMembers", "Class Members")
                .page("courses/:uuid/groups", "TeacherGroups", "Group Management")
                .page("courses/:uuid/progress", "TeacherProgressUnits", "Learning Progress")
                .page(
                    "courses/:uuid/progress/units/:unitId",
                    "TeacherProgressUnitDetail",
                    "Unit Progress",
                )
                .page("courses/:uuid/homework", "TeacherHomeworkUnits", "Homework Management")
                .page(
                    "courses/:uuid/homework/units/:unitId",
                    "TeacherHomeworkUnitDetail",
                    "Unit Homework Management",
                )
                .page("profile", "TeacherProfile", "Profile")
                .page("change-password", "TeacherChangePassword", "Change Password")
        })
        // Channel partners
        .login(
            Realm::ChannelPartner.login_path(),
            "ChannelLogin",
            &format!("Channel Partner Login{CHANNEL_SUFFIX}"),
            Realm::ChannelPartner,
        )
        .section("/channel", channel, CHANNEL_SUFFIX, |s| {
            s.redirect("", "ChannelHome", RouteKind::Home(Realm::ChannelPartner), "/channel/dashboard")
                .page("dashboard", "ChannelDashboard", "Dashboard")
                .page("schools", "ChannelSchools", "School Management")
                .page("schools/:id", "ChannelSchoolDetail", "School Details")
                .page("schools/:id/courses", "ChannelSchoolCourses", "Course List")
                .page("courses/:uuid", "ChannelCourseView", "Course Details")
        })
        .fallback(Realm::Learner.home_path())
        .build()
}
