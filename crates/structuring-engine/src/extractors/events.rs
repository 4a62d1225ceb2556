//! Event extraction
//!
//! Every EVTDATE is an anchor. The EVT closest before it, and after the
//! previous anchor, names the event. Repeatable details (organizers,
//! equipment, attendee counts, agenda rows) go to the nearest event whose
//! name starts before them, never to a later one.

use shared_types::{EntityTag, Equipment, Event, Organizer, ScheduleItem, Span};
use tracing::{debug, instrument, trace};

use crate::config::ExtractionConfig;
use crate::extractors::schedule::resolve_schedule_item;
use crate::patterns::clean_text;
use crate::pool::{EntityPool, Stage};
use crate::proximity::{find_nearest, Direction};

/// Extract events from what the earlier stages left over.
///
/// This is the last stage; the pool is handed back only so callers can
/// inspect the final partition.
#[instrument(skip_all, fields(entities = pool.len()))]
pub fn extract_events(mut pool: EntityPool, config: &ExtractionConfig) -> (Vec<Event>, EntityPool) {
    let mut builders = segment(&mut pool);
    if builders.is_empty() {
        debug!("No named events found");
        return (Vec::new(), pool);
    }

    resolve_time_and_location(&mut pool, &mut builders);
    allocate_organizers(&mut pool, &mut builders, config);
    allocate_equipment(&mut pool, &mut builders, config);
    allocate_attendees(&mut pool, &mut builders);
    allocate_schedule(&mut pool, &mut builders, config);

    let events: Vec<Event> = builders.into_iter().map(EventBuilder::build).collect();
    debug!("Found {} events", events.len());
    (events, pool)
}

/// One event under construction, with the name position used for allocation
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event: Event,
    name_span: Span,
}

impl EventBuilder {
    pub fn new(name: &str, date: &str, name_span: Span) -> Self {
        Self {
            event: Event {
                event_name: clean_text(name),
                date: clean_text(date),
                ..Event::default()
            },
            name_span,
        }
    }

    pub fn name_span(&self) -> Span {
        self.name_span
    }

    pub fn set_time(&mut self, text: &str) {
        self.event.time = clean_text(text);
    }

    pub fn set_location(&mut self, text: &str) {
        self.event.location = clean_text(text);
    }

    pub fn add_organizer(&mut self, name: &str, contact: &str) {
        self.event.organizers.push(Organizer {
            name: clean_text(name),
            contact: clean_text(contact),
        });
    }

    pub fn add_equipment(&mut self, item: &str, quantity: String) {
        self.event.equipment.push(Equipment {
            item: clean_text(item),
            quantity,
        });
    }

    pub fn has_attendees(&self) -> bool {
        !self.event.attendees.is_empty()
    }

    pub fn set_attendees(&mut self, text: &str) {
        self.event.attendees = clean_text(text);
    }

    pub fn push_schedule(&mut self, row: ScheduleItem) {
        self.event.schedule.push(row);
    }

    /// Drop the bookkeeping and return the finished event
    pub fn build(self) -> Event {
        self.event
    }
}

fn segment(pool: &mut EntityPool) -> Vec<EventBuilder> {
    let names = pool.unclaimed_with(&EntityTag::Evt);
    let mut builders = Vec::new();
    let mut window_start: Option<usize> = None;

    for anchor_idx in pool.unclaimed_with(&EntityTag::EvtDate) {
        let Some(anchor) = pool.get(anchor_idx).span else {
            continue;
        };

        let name_idx = find_nearest(
            anchor,
            pool.spans(&names),
            Direction::StartsBefore,
            None,
            |idx| match (window_start, pool.get(idx).start()) {
                (Some(lower), Some(start)) => start > lower,
                _ => true,
            },
        );
        window_start = Some(anchor.start);

        let Some(name_idx) = name_idx else {
            trace!("Anchor {} has no event name, dropped", anchor_idx);
            continue;
        };
        let Some(name_span) = pool.get(name_idx).span else {
            continue;
        };

        builders.push(EventBuilder::new(
            &pool.get(name_idx).text,
            &pool.get(anchor_idx).text,
            name_span,
        ));
        pool.claim(name_idx, Stage::Event);
        pool.claim(anchor_idx, Stage::Event);
    }

    builders
}

/// Time and location are nearest to the name in either direction and may be
/// shared by several events
fn resolve_time_and_location(pool: &mut EntityPool, builders: &mut [EventBuilder]) {
    let times = pool.unclaimed_with(&EntityTag::EvtTime);
    let locations = pool.unclaimed_with(&EntityTag::EvtLoc);

    for builder in builders.iter_mut() {
        let anchor = builder.name_span();
        let time = find_nearest(anchor, pool.spans(&times), Direction::Around, None, |_| true);
        let location = find_nearest(anchor, pool.spans(&locations), Direction::Around, None, |_| true);

        if let Some(idx) = time {
            builder.set_time(&pool.get(idx).text);
            pool.claim(idx, Stage::Event);
        }
        if let Some(idx) = location {
            builder.set_location(&pool.get(idx).text);
            pool.claim(idx, Stage::Event);
        }
    }
}

/// Index of the builder whose name starts closest before `span`
fn owning_event(builders: &[EventBuilder], span: Span) -> Option<usize> {
    let names = builders
        .iter()
        .enumerate()
        .map(|(i, builder)| (i, builder.name_span()));
    find_nearest(span, names, Direction::StartsBefore, None, |_| true)
}

fn allocate_organizers(pool: &mut EntityPool, builders: &mut [EventBuilder], config: &ExtractionConfig) {
    for idx in pool.unclaimed_with(&EntityTag::Per) {
        let Some(span) = pool.get(idx).span else {
            continue;
        };
        let Some(owner) = owning_event(builders, span) else {
            trace!("Organizer {} precedes every event", idx);
            continue;
        };

        let phones = pool.unclaimed_with(&EntityTag::Phone);
        let contact_idx = find_nearest(
            span,
            pool.spans(&phones),
            Direction::After,
            Some(config.organizer_contact_max_gap),
            |_| true,
        );
        let contact = contact_idx.map(|c| pool.get(c).text.as_str()).unwrap_or("");

        builders[owner].add_organizer(&pool.get(idx).text, contact);
        pool.claim(idx, Stage::Event);
        if let Some(c) = contact_idx {
            pool.claim(c, Stage::Event);
        }
    }
}

fn allocate_equipment(pool: &mut EntityPool, builders: &mut [EventBuilder], config: &ExtractionConfig) {
    for idx in pool.unclaimed_with(&EntityTag::Item) {
        let Some(span) = pool.get(idx).span else {
            continue;
        };
        let Some(owner) = owning_event(builders, span) else {
            continue;
        };

        let quantities = pool.unclaimed_with(&EntityTag::ItemQty);
        let quantity_idx = find_nearest(
            span,
            pool.spans(&quantities),
            Direction::After,
            Some(config.equipment_quantity_max_gap),
            |_| true,
        );
        let quantity = quantity_idx
            .map(|q| clean_text(&pool.get(q).text))
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| config.default_equipment_quantity.clone());

        builders[owner].add_equipment(&pool.get(idx).text, quantity);
        pool.claim(idx, Stage::Event);
        if let Some(q) = quantity_idx {
            pool.claim(q, Stage::Event);
        }
    }
}

fn allocate_attendees(pool: &mut EntityPool, builders: &mut [EventBuilder]) {
    for idx in pool.unclaimed_with(&EntityTag::PeoQty) {
        let Some(span) = pool.get(idx).span else {
            continue;
        };
        let Some(owner) = owning_event(builders, span) else {
            continue;
        };
        if builders[owner].has_attendees() {
            trace!("Event {} already has an attendee count", owner);
            continue;
        }
        builders[owner].set_attendees(&pool.get(idx).text);
        pool.claim(idx, Stage::Event);
    }
}

fn allocate_schedule(pool: &mut EntityPool, builders: &mut [EventBuilder], config: &ExtractionConfig) {
    let single_event = builders.len() == 1;

    for idx in pool.unclaimed_with(&EntityTag::ScheduleItem) {
        let owner = if single_event {
            Some(0)
        } else {
            pool.get(idx).span.and_then(|span| owning_event(builders, span))
        };
        let Some(owner) = owner else {
            continue;
        };
        let row = resolve_schedule_item(pool, idx, config);
        builders[owner].push_schedule(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::Entity;

    fn events(entities: Vec<Entity>) -> (Vec<Event>, EntityPool) {
        extract_events(EntityPool::new(entities), &ExtractionConfig::default())
    }

    #[test]
    fn test_event_name_date_time_location() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::EvtTime, "10.00 WIB", 5, 7),
            Entity::new(EntityTag::EvtLoc, "Aula", 8, 9),
            Entity::new(EntityTag::Evt, "Rapat Paroki", 10, 22),
            Entity::new(EntityTag::EvtDate, "12 Januari 2024", 30, 45),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "Rapat Paroki");
        assert_eq!(events[0].date, "12 Januari 2024");
        assert_eq!(events[0].time, "10.00 WIB");
        assert_eq!(events[0].location, "Aula");
        assert!(pool.remaining().is_empty());
    }

    #[test]
    fn test_anchor_without_name_is_dropped() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 0, 10),
            Entity::new(EntityTag::EvtTime, "09.00", 12, 17),
        ]);
        assert!(events.is_empty());
        assert_eq!(pool.remaining().len(), 2);
    }

    #[test]
    fn test_names_stay_inside_their_window() {
        let (events, _) = events(vec![
            Entity::new(EntityTag::Evt, "Misa Syukur", 0, 11),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 20, 30),
            Entity::new(EntityTag::EvtDate, "2 Mei 2024", 40, 50),
            Entity::new(EntityTag::Evt, "Ziarah", 60, 66),
            Entity::new(EntityTag::EvtDate, "3 Mei 2024", 80, 90),
        ]);
        let names: Vec<(&str, &str)> = events
            .iter()
            .map(|e| (e.event_name.as_str(), e.date.as_str()))
            .collect();
        assert_eq!(names, vec![("Misa Syukur", "1 Mei 2024"), ("Ziarah", "3 Mei 2024")]);
    }

    #[test]
    fn test_organizer_before_the_event_is_not_attached() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::Per, "Budi", 0, 4),
            Entity::new(EntityTag::Evt, "Rapat Paroki", 10, 22),
            Entity::new(EntityTag::EvtDate, "12 Januari 2024", 30, 45),
        ]);
        assert!(events[0].organizers.is_empty());
        assert_eq!(pool.remaining().len(), 1);
    }

    #[test]
    fn test_organizer_contact_and_owner() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::Evt, "Rapat", 0, 5),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 10, 20),
            Entity::new(EntityTag::Per, "Budi", 30, 34),
            Entity::new(EntityTag::Phone, "0812-3456", 40, 49),
            Entity::new(EntityTag::Evt, "Rekoleksi", 100, 109),
            Entity::new(EntityTag::EvtDate, "5 Mei 2024", 110, 120),
            Entity::new(EntityTag::Per, "Ani", 130, 133),
        ]);
        assert_eq!(
            events[0].organizers,
            vec![Organizer {
                name: "Budi".to_string(),
                contact: "0812-3456".to_string(),
            }]
        );
        assert_eq!(
            events[1].organizers,
            vec![Organizer {
                name: "Ani".to_string(),
                contact: String::new(),
            }]
        );
        assert!(pool.remaining().is_empty());
    }

    #[test]
    fn test_equipment_quantity_and_default() {
        let (events, _) = events(vec![
            Entity::new(EntityTag::Evt, "Rapat", 0, 5),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 10, 20),
            Entity::new(EntityTag::Item, "Kursi", 30, 35),
            Entity::new(EntityTag::ItemQty, "50 buah", 37, 44),
            Entity::new(EntityTag::Item, "Proyektor", 60, 69),
        ]);
        assert_eq!(
            events[0].equipment,
            vec![
                Equipment {
                    item: "Kursi".to_string(),
                    quantity: "50 buah".to_string(),
                },
                Equipment {
                    item: "Proyektor".to_string(),
                    quantity: "1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_first_attendee_count_wins() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::Evt, "Rapat", 0, 5),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 10, 20),
            Entity::new(EntityTag::PeoQty, "40", 30, 32),
            Entity::new(EntityTag::PeoQty, "60", 50, 52),
        ]);
        assert_eq!(events[0].attendees, "40");
        assert_eq!(pool.remaining().len(), 1);
        assert_eq!(pool.remaining()[0].text, "60");
    }

    #[test]
    fn test_single_event_takes_every_schedule_item() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::ScheduleItem, "Registrasi", 0, 10),
            Entity::new(EntityTag::Evt, "Rekoleksi", 20, 29),
            Entity::new(EntityTag::EvtDate, "5 Mei 2024", 35, 45),
            Entity::new(EntityTag::ScheduleTime, "08.00", 500, 505),
            Entity::new(EntityTag::ScheduleItem, "Misa", 507, 511),
        ]);
        let rows: Vec<(&str, &str)> = events[0]
            .schedule
            .iter()
            .map(|r| (r.description.as_str(), r.start_time.as_str()))
            .collect();
        assert_eq!(rows, vec![("Registrasi", ""), ("Misa", "08.00")]);
        assert!(pool.remaining().is_empty());
    }

    #[test]
    fn test_schedule_items_split_across_events() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::ScheduleItem, "Persiapan", 0, 9),
            Entity::new(EntityTag::Evt, "Rapat", 20, 25),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 30, 40),
            Entity::new(EntityTag::ScheduleItem, "Doa Pembuka", 50, 61),
            Entity::new(EntityTag::Evt, "Rekoleksi", 100, 109),
            Entity::new(EntityTag::EvtDate, "5 Mei 2024", 110, 120),
            Entity::new(EntityTag::ScheduleItem, "Sharing", 130, 137),
        ]);
        assert_eq!(events[0].schedule.len(), 1);
        assert_eq!(events[0].schedule[0].description, "Doa Pembuka");
        assert_eq!(events[1].schedule[0].description, "Sharing");
        assert_eq!(pool.remaining().len(), 1);
        assert_eq!(pool.remaining()[0].text, "Persiapan");
    }

    #[test]
    fn test_schedule_rows_do_not_reach_past_earlier_rows() {
        let (events, pool) = events(vec![
            Entity::new(EntityTag::Evt, "Rekoleksi", 0, 9),
            Entity::new(EntityTag::EvtDate, "5 Mei 2024", 12, 22),
            Entity::new(EntityTag::ScheduleTime, "07.00", 30, 35),
            Entity::new(EntityTag::ScheduleTime, "09.00", 58, 63),
            Entity::new(EntityTag::ScheduleItem, "Sarapan", 65, 72),
            Entity::new(EntityTag::ScheduleItem, "Doa", 74, 77),
        ]);
        let rows: Vec<(&str, &str)> = events[0]
            .schedule
            .iter()
            .map(|r| (r.description.as_str(), r.start_time.as_str()))
            .collect();
        assert_eq!(rows, vec![("Sarapan", "09.00"), ("Doa", "")]);
        assert_eq!(pool.remaining()[0].text, "07.00");
    }

    #[test]
    fn test_time_is_shared_between_events() {
        let (events, _) = events(vec![
            Entity::new(EntityTag::EvtTime, "19.00", 0, 5),
            Entity::new(EntityTag::Evt, "Novena I", 10, 18),
            Entity::new(EntityTag::EvtDate, "1 Mei 2024", 20, 30),
            Entity::new(EntityTag::Evt, "Novena II", 40, 49),
            Entity::new(EntityTag::EvtDate, "2 Mei 2024", 50, 60),
        ]);
        assert_eq!(events[0].time, "19.00");
        assert_eq!(events[1].time, "19.00");
    }
}
