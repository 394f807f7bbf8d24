//! Shared data types for the storage layer

mod enums;
mod rows;

pub use enums::{AttendanceStatus, ChallengeKind, UploadKind};
pub use rows::{
    ActivityRow, AttendanceRow, AttendanceSummary, ChallengeRow, CommentWithAuthor, GroupRow,
    GroupWithMemberCount, LeaderboardEntry, MemberWithUser, MembershipRow, MessageWithAuthor,
    ProgressRow, RunCommentRow, ScheduledRunRow, ShoeRow, ShoeWithMileage, UserRow,
};
