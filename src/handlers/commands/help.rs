//! Help command handler

/// Text shown for the `help` command
pub fn help_text() -> &'static str {
    "EventDesk commands\n\n\
        help                          - Show this help message\n\
        users                         - List users\n\
        adduser <username> <role> <email> <full name> - Create a user (admin, organizer, attendee)\n\
        create <actor_id> <slots> <event_date> <deadline> <title> - Create an event (RFC 3339 dates)\n\
        submit <actor_id> <event_id>  - Submit a draft event for approval\n\
        events                        - List events\n\
        event <event_id>              - Show event details and capacity\n\
        participants <event_id>       - List active registrations\n\
        dashboard <user_id>           - Show a user's registrations and events\n\
        register <event_id> <user_id> - Register a user for an event\n\
        cancel <registration_id>      - Cancel a registration\n\
        confirm <registration_id>     - Approve a pending registration\n\
        decline <registration_id>     - Reject a pending registration and free its slot\n\
        checkin <registration_id>     - Check in an approved attendee\n\
        noshow <registration_id>      - Mark an approved attendee as absent\n\
        approve <admin_id> <event_id> - Approve a pending event\n\
        reject <admin_id> <event_id>  - Reject a pending event"
}
