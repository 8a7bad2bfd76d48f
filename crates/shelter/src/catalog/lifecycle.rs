use super::domain::ApplicationStatus;

/// Every admitted `(from, to)` move. Anything absent from this table is rejected.
const TRANSITIONS: &[(ApplicationStatus, ApplicationStatus)] = &[
    (ApplicationStatus::Pending, ApplicationStatus::Approved),
    (ApplicationStatus::Pending, ApplicationStatus::Rejected),
    (ApplicationStatus::Approved, ApplicationStatus::Completed),
];

impl ApplicationStatus {
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == next)
    }

    pub fn next_states(self) -> impl Iterator<Item = ApplicationStatus> {
        TRANSITIONS
            .iter()
            .filter(move |(from, _)| *from == self)
            .map(|&(_, to)| to)
    }

    pub fn is_terminal(self) -> bool {
        self.next_states().next().is_none()
    }

    /// Reaching this status takes the pet out of the catalog.
    pub fn marks_pet_adopted(self) -> bool {
        matches!(self, ApplicationStatus::Completed)
    }
}
