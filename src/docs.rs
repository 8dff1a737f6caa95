use crate::api::{
    ReviewBody,
    attendance::OverrideBody,
    employee::{EmployeeQuery, PfEligibilityQuery},
    pams::{PamsResubmitBody, PamsReviewBody},
    payroll::PayrollQuery,
    policy::PolicyQuery,
    profile_update::ProfileUpdateBody,
    promotion::StatusQuery,
    resignation::{HandoverBody, ResignationDecision, ResignationQuery},
};
use crate::eligibility::Verdict;
use crate::model::{
    approval::{AuditEntry, AuditTrail, Document, DocumentInput, RequestStatus},
    attendance::{Attendance, AttendanceCorrection, AttendanceStatus},
    employee::{
        AdministrativeDuty, Dependent, Employee, EmploymentStatus, GrantOutcome, ProfileSection, Publication,
        Qualification, ResearchGrant, Supervision,
    },
    leave_request::{LeaveRequest, LeaveType},
    pams::{Assessment, PamsCategory, PamsStatus, PamsSubmission, Workload},
    payroll::{PayrollItem, PayrollRun, PayrollSettings},
    policy_document::{PolicyCategory, PolicyDocument},
    profile_update::ProfileUpdateRequest,
    promotion::PromotionRequest,
    provident_fund::{LoanType, PfRequest},
    resignation::{ExitSurvey, HandoverStatus, Resignation, ResignationStatus},
    role::Role,
};
use crate::models::{LoginReqDto, LoginResponse, UserReq};
use crate::service::{
    AttendanceFilter, CorrectionFilter, LeaveFilter, MarkAttendance, NewCorrection, NewEmployee, NewLeave,
    NewPams, NewPfRequest, NewPromotion, NewResignation, PamsFilter, PamsResubmission,
};
use crate::workflow::{
    chain::{ApprovalChain, ApprovalStep, Decision, StepStatus},
    pams::{PamsAction, PamsReview},
    resignation::ResignationAction,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Workflow API",
        version = "1.0.0",
        description = r#"
## University HRMS Workflow Service

Approval workflows and eligibility rules for a university HR office.

### 🔹 Key Features
- **Employee Management**
  - Profiles, nested academic records, self-service change requests
- **Leave Management**
  - Role-based approval chains (HOD → Dean → HR, VC → President for senior staff)
- **PAMS Appraisals**
  - Submitted → HOD → Dean → VC → HR final, with return and resubmission
- **Attendance**
  - Check-in/out, correction requests, HR override, CSV export
- **Resignation**
  - Lifecycle, exit survey, handover tracking, printable form
- **Promotion & Provident Fund**
  - Chained promotion review, CECPF loan/withdrawal eligibility
- **Payroll**
  - Monthly computation from attendance, posted runs, tunable settings

### 🔐 Security
Protected endpoints take a **JWT Bearer** access token from `/auth/login`.
Refresh tokens are single use.

### 📦 Response Format
- JSON bodies; errors are `{"error": <kind>, "message": <reason>}`
- List endpoints are paginated: `{data, page, per_page, total}`
- Decisions accept an optional `expected_version` for optimistic concurrency

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::register,
        crate::auth::handlers::me,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::leave_balance,
        crate::api::employee::maternity_eligibility,
        crate::api::employee::pf_eligibility,
        crate::api::employee::list_records,
        crate::api::employee::add_record,
        crate::api::employee::update_record,
        crate::api::employee::remove_record,
        crate::api::profile_update::submit_profile_update,
        crate::api::profile_update::review_profile_update,
        crate::api::profile_update::list_profile_updates,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::review_leave,

        crate::api::pams::submit_pams,
        crate::api::pams::review_pams,
        crate::api::pams::resubmit_pams,
        crate::api::pams::get_pams,
        crate::api::pams::list_pams,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::submit_correction,
        crate::api::attendance::list_corrections,
        crate::api::attendance::get_correction,
        crate::api::attendance::review_correction,
        crate::api::attendance::override_correction,
        crate::api::attendance::export_corrections,

        crate::api::resignation::submit_resignation,
        crate::api::resignation::decide_resignation,
        crate::api::resignation::submit_exit_survey,
        crate::api::resignation::set_handover,
        crate::api::resignation::get_resignation,
        crate::api::resignation::list_resignations,
        crate::api::resignation::resignation_form,

        crate::api::promotion::submit_promotion,
        crate::api::promotion::review_promotion,
        crate::api::promotion::get_promotion,
        crate::api::promotion::list_promotions,

        crate::api::provident_fund::submit_pf_request,
        crate::api::provident_fund::review_pf_request,
        crate::api::provident_fund::get_pf_request,
        crate::api::provident_fund::list_pf_requests,

        crate::api::payroll::compute_payroll,
        crate::api::payroll::payslip,
        crate::api::payroll::post_payroll_run,
        crate::api::payroll::list_payroll_runs,
        crate::api::payroll::get_settings,
        crate::api::payroll::update_settings,

        crate::api::policy::list_policies,
        crate::api::policy::get_policy
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            UserReq,
            Role,
            ReviewBody,
            Decision,
            ApprovalChain,
            ApprovalStep,
            StepStatus,
            AuditEntry,
            AuditTrail,
            Document,
            DocumentInput,
            RequestStatus,
            Verdict,
            Employee,
            EmploymentStatus,
            NewEmployee,
            EmployeeQuery,
            PfEligibilityQuery,
            ProfileSection,
            Supervision,
            ResearchGrant,
            GrantOutcome,
            AdministrativeDuty,
            Publication,
            Qualification,
            Dependent,
            ProfileUpdateRequest,
            ProfileUpdateBody,
            LeaveRequest,
            LeaveType,
            NewLeave,
            LeaveFilter,
            PamsSubmission,
            PamsStatus,
            PamsCategory,
            Workload,
            Assessment,
            NewPams,
            PamsFilter,
            PamsReview,
            PamsAction,
            PamsReviewBody,
            PamsResubmission,
            PamsResubmitBody,
            Attendance,
            AttendanceStatus,
            AttendanceCorrection,
            MarkAttendance,
            AttendanceFilter,
            NewCorrection,
            CorrectionFilter,
            OverrideBody,
            Resignation,
            ResignationStatus,
            ResignationAction,
            ResignationDecision,
            ResignationQuery,
            NewResignation,
            ExitSurvey,
            HandoverStatus,
            HandoverBody,
            PromotionRequest,
            NewPromotion,
            StatusQuery,
            PfRequest,
            LoanType,
            NewPfRequest,
            PayrollItem,
            PayrollRun,
            PayrollSettings,
            PayrollQuery,
            PolicyDocument,
            PolicyCategory,
            PolicyQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, token rotation and user accounts"),
        (name = "Employee", description = "Employee profiles and records"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "PAMS", description = "Performance appraisal workflow"),
        (name = "Attendance", description = "Attendance and correction APIs"),
        (name = "Resignation", description = "Resignation lifecycle"),
        (name = "Promotion", description = "Promotion requests"),
        (name = "Provident Fund", description = "CECPF loans and withdrawals"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Policy", description = "Policy document catalog"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
