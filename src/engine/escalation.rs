//! Escalation rule matching and effective renotification intervals.

use chrono::{DateTime, Utc};

use super::time_window;
use crate::{
    models::{EscalationRule, MonitoredEntity, NotificationOptions},
    store::ObjectStore,
};

/// Whether an escalation rule applies to the entity's current notification.
///
/// The ordinal compared against the rule's bounds is the entity's current
/// notification number, minus one when the entity has recovered — the
/// ordinal was counting the problem notifications the recovery closes out.
pub fn rule_matches(
    entity: &MonitoredEntity,
    rule: &EscalationRule,
    options: NotificationOptions,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> bool {
    if rule.entity != entity.key() {
        return false;
    }

    // Broadcast notifications go to everyone an escalation could reach.
    if options.broadcast {
        return true;
    }

    let ordinal = if entity.current_state.is_good() {
        entity.current_notification_number as i64 - 1
    } else {
        entity.current_notification_number as i64
    };

    if ordinal < rule.first_notification as i64 {
        return false;
    }

    if rule.last_notification != 0 && ordinal > rule.last_notification as i64 {
        return false;
    }

    if let Some(period_name) = &rule.escalation_period {
        let period = store.time_period(period_name);
        if !time_window::is_time_valid(now, period.as_deref()) {
            return false;
        }
    }

    if !rule.escalate_on.for_state(entity.current_state) {
        return false;
    }

    true
}

/// Whether any escalation rule matches the entity's current notification.
pub fn is_escalated(
    entity: &MonitoredEntity,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> bool {
    store
        .escalations_for(&entity.key())
        .iter()
        .any(|rule| rule_matches(entity, rule, NotificationOptions::NONE, store, now))
}

/// The renotification interval in effect for the entity, in multiples of
/// the base interval unit.
///
/// The minimum non-negative override among matching escalation rules wins;
/// with no matching override the entity's own interval applies.
pub fn effective_interval(
    entity: &MonitoredEntity,
    store: &dyn ObjectStore,
    now: DateTime<Utc>,
) -> f64 {
    let mut interval = entity.notification_interval;
    let mut have_override = false;

    for rule in store.escalations_for(&entity.key()) {
        if !rule_matches(entity, &rule, NotificationOptions::NONE, store, now) {
            continue;
        }
        if rule.notification_interval < 0.0 {
            continue;
        }
        if !have_override || rule.notification_interval < interval {
            interval = rule.notification_interval;
            have_override = true;
        }
    }

    interval
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        models::{
            EntityKey, EntityState, EscalationRule, HostState, NotifyFlags, ServiceState,
            TimePeriod, TimeRange,
        },
        store::{MemoryObjectStore, MockObjectStore},
        test_helpers::{EntityBuilder, EscalationRuleBuilder},
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 3, 12, 0, 0).unwrap()
    }

    fn critical_service(notification_number: u32) -> MonitoredEntity {
        EntityBuilder::service("web01", "http")
            .state(EntityState::Service(ServiceState::Critical))
            .notification_number(notification_number)
            .build()
    }

    #[test]
    fn test_rule_for_other_entity_never_matches() {
        let store = MockObjectStore::new();
        let entity = critical_service(3);
        let rule = EscalationRuleBuilder::service("db01", "postgres").build();

        assert!(!rule_matches(&entity, &rule, NotificationOptions::NONE, &store, now()));
    }

    #[test]
    fn test_broadcast_matches_unconditionally() {
        let store = MockObjectStore::new();
        // Ordinal 0 is far below the rule's first notification bound.
        let entity = critical_service(0);
        let rule =
            EscalationRuleBuilder::service("web01", "http").notification_window(5, 9).build();

        assert!(rule_matches(&entity, &rule, NotificationOptions::broadcast(), &store, now()));
    }

    #[test]
    fn test_ordinal_window() {
        let store = MockObjectStore::new();
        let rule =
            EscalationRuleBuilder::service("web01", "http").notification_window(2, 4).build();

        let matched: Vec<u32> = (1..=5)
            .filter(|n| {
                rule_matches(
                    &critical_service(*n),
                    &rule,
                    NotificationOptions::NONE,
                    &store,
                    now(),
                )
            })
            .collect();
        assert_eq!(matched, vec![2, 3, 4]);
    }

    #[test]
    fn test_last_notification_zero_is_unbounded() {
        let store = MockObjectStore::new();
        let rule =
            EscalationRuleBuilder::service("web01", "http").notification_window(2, 0).build();

        assert!(rule_matches(
            &critical_service(250),
            &rule,
            NotificationOptions::NONE,
            &store,
            now()
        ));
    }

    #[test]
    fn test_recovery_uses_previous_ordinal() {
        let store = MockObjectStore::new();
        let rule =
            EscalationRuleBuilder::service("web01", "http").notification_window(2, 2).build();

        // A recovered service at ordinal 3 matches a rule bounded at 2.
        let recovered = EntityBuilder::service("web01", "http")
            .state(EntityState::Service(ServiceState::Ok))
            .notification_number(3)
            .build();
        assert!(rule_matches(&recovered, &rule, NotificationOptions::NONE, &store, now()));

        // Still in the problem state, ordinal 3 is past the window.
        assert!(!rule_matches(
            &critical_service(3),
            &rule,
            NotificationOptions::NONE,
            &store,
            now()
        ));
    }

    #[test]
    fn test_escalation_period_gates_match() {
        let mut store = MemoryObjectStore::new();
        let mut days: [Vec<TimeRange>; 7] = Default::default();
        // Monday 00:00-06:00 only; `now()` is Monday noon.
        days[1] = vec![TimeRange { start: 0, end: 6 * 3600 }];
        store.add_time_period(TimePeriod { name: "night".to_string(), days });

        let rule = EscalationRuleBuilder::service("web01", "http")
            .escalation_period("night")
            .build();

        assert!(!rule_matches(
            &critical_service(2),
            &rule,
            NotificationOptions::NONE,
            &store,
            now()
        ));
    }

    #[test]
    fn test_severity_flag_gates_match() {
        let store = MockObjectStore::new();
        let rule = EscalationRule {
            entity: EntityKey::service("web01", "http"),
            first_notification: 1,
            last_notification: 0,
            escalation_period: None,
            notification_interval: -1.0,
            escalate_on: NotifyFlags { warning: true, ..Default::default() },
            contacts: vec![],
            contact_groups: vec![],
        };

        assert!(!rule_matches(
            &critical_service(2),
            &rule,
            NotificationOptions::NONE,
            &store,
            now()
        ));

        let warning = EntityBuilder::service("web01", "http")
            .state(EntityState::Service(ServiceState::Warning))
            .notification_number(2)
            .build();
        assert!(rule_matches(&warning, &rule, NotificationOptions::NONE, &store, now()));
    }

    #[test]
    fn test_effective_interval_takes_minimum_override() {
        let mut store = MemoryObjectStore::new();
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").interval_override(5.0).build(),
        );
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").interval_override(3.0).build(),
        );
        // A negative override is the "use base" sentinel and is skipped.
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").interval_override(-1.0).build(),
        );

        let entity = {
            let mut e = critical_service(2);
            e.notification_interval = 1.0;
            e
        };
        assert_eq!(effective_interval(&entity, &store, now()), 3.0);
    }

    #[test]
    fn test_effective_interval_falls_back_to_entity_interval() {
        let store = MemoryObjectStore::new();
        let mut entity = critical_service(2);
        entity.notification_interval = 7.5;
        assert_eq!(effective_interval(&entity, &store, now()), 7.5);
    }

    #[test]
    fn test_effective_interval_first_override_wins_even_if_larger() {
        let mut store = MemoryObjectStore::new();
        store.add_escalation(
            EscalationRuleBuilder::service("web01", "http").interval_override(9.0).build(),
        );

        let mut entity = critical_service(2);
        entity.notification_interval = 1.0;
        // The matched override replaces the base interval outright.
        assert_eq!(effective_interval(&entity, &store, now()), 9.0);
    }

    #[test]
    fn test_is_escalated_for_host_rules() {
        let mut store = MemoryObjectStore::new();
        store.add_escalation(EscalationRuleBuilder::host("web01").build());

        let host = EntityBuilder::host("web01")
            .state(EntityState::Host(HostState::Down))
            .notification_number(1)
            .build();
        assert!(is_escalated(&host, &store, now()));
    }
}
