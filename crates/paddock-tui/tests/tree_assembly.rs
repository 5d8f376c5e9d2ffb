mod common;

use std::sync::atomic::Ordering;

use common::{context, context_with, strings, FakeCatalog};
use paddock_proto::config::Config;
use paddock_proto::dto::{Season, SeasonList, SessionStatus, VodType, VodTypeList};
use paddock_tui::tree::{
    build_archive_nodes, build_event_nodes, build_session_nodes, detect_live_session,
    load_children, BuildError, Category, ContentNode, NodeStyle, Payload,
};

fn season(event_ids: &[&str]) -> Season {
    Season {
        name: "2021".to_string(),
        year: 2021,
        event_ids: strings(event_ids),
        ..Default::default()
    }
}

fn event_payload(node_label: &str, api: &FakeCatalog, id: &str) -> ContentNode {
    ContentNode::new(node_label, Payload::Event(api.events[id].clone()))
}

#[tokio::test]
async fn test_events_keep_season_order_under_reversed_latency() {
    let api = FakeCatalog::default()
        .event("e1", "Bahrain", &["s1"])
        .event("e2", "Imola", &["s1"])
        .event("e3", "Testing", &[])
        .event("e4", "Portimao", &["s1"])
        .delay("e1", 40)
        .delay("e2", 30)
        .delay("e4", 5);
    let (_api, ctx) = context(api);

    let nodes = build_event_nodes(&ctx, &season(&["e1", "e2", "e3", "e4"]))
        .await
        .unwrap();
    let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["Bahrain", "Imola", "Portimao"]);
    assert!(nodes.iter().all(|n| matches!(n.payload(), Payload::Event(_))));
}

#[tokio::test]
async fn test_only_live_session_is_marked() {
    let api = FakeCatalog::default()
        .event("e1", "Monaco", &["s1", "s2", "s3"])
        .session("s1", "Qualifying", SessionStatus::Upcoming, &[])
        .session("s2", "Race", SessionStatus::Live, &[])
        .session("s3", "Practice 1", SessionStatus::Expired, &[]);
    let event = api.events["e1"].clone();
    let (_api, ctx) = context(api);

    let nodes = build_session_nodes(&ctx, &event).await.unwrap();
    assert_eq!(nodes.len(), 1);
    let live = &nodes[0];
    assert_eq!(live.label, "Race - LIVE");
    assert_eq!(live.style, NodeStyle::Red);
    assert!(!live.expanded);
    assert_eq!(live.child_labels(), ["Main Feed", "(44) driver"]);
    assert!(live.children.iter().all(|c| c.style == NodeStyle::Green));
}

#[tokio::test]
async fn test_bonus_ids_collected_in_session_order() {
    let api = FakeCatalog::default()
        .event("e1", "Monaco", &["s1", "s2", "s3"])
        .session("s1", "Practice 1", SessionStatus::Replay, &["b1", "b2"])
        .session("s2", "Qualifying", SessionStatus::Upcoming, &["b3"])
        .session("s3", "Race", SessionStatus::Replay, &[])
        .episode("b1", "Monaco Preview", "2021_monaco")
        .episode("b2", "Monaco Analysis", "2021_monaco")
        .episode("b3", "Onboard Lap", "onboard")
        .delay("s1", 30)
        .delay("s2", 15);
    let event = api.events["e1"].clone();
    let (api, ctx) = context(api);

    let nodes = build_session_nodes(&ctx, &event).await.unwrap();
    let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["Practice 1", "Race", "Bonus Content"]);

    let requests = api.episode_requests.lock().unwrap().clone();
    assert_eq!(requests, vec![strings(&["b1", "b2", "b3"])]);

    let bonus = &nodes[2];
    assert_eq!(bonus.payload(), &Payload::Bonus);
    assert!(!bonus.expanded);
    assert_eq!(bonus.child_labels(), ["2021", "Onboard Lap"]);
    assert_eq!(
        bonus.children[0].child_labels(),
        ["Monaco Analysis", "Monaco Preview"]
    );
}

#[tokio::test]
async fn test_no_bonus_node_without_bonus_ids() {
    let api = FakeCatalog::default()
        .event("e1", "Monaco", &["s1"])
        .session("s1", "Race", SessionStatus::Replay, &[]);
    let event = api.events["e1"].clone();
    let (api, ctx) = context(api);

    let nodes = build_session_nodes(&ctx, &event).await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(api.episode_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_failure_fails_the_event() {
    let api = FakeCatalog::default()
        .event("e1", "Monaco", &["s1", "s2", "s3"])
        .session("s1", "Practice 1", SessionStatus::Replay, &[])
        .session("s2", "Qualifying", SessionStatus::Replay, &[])
        .session("s3", "Race", SessionStatus::Replay, &[])
        .fail("s2")
        .delay("s3", 20);
    let event = api.events["e1"].clone();
    let (_api, ctx) = context(api);

    let err = build_session_nodes(&ctx, &event).await.unwrap_err();
    match err {
        BuildError::Fetch { context, .. } => {
            assert!(context.contains("Monaco"), "{}", context);
            assert!(context.contains("s2"), "{}", context);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fanout_limit_bounds_concurrent_fetches() {
    let ids = ["e1", "e2", "e3", "e4", "e5", "e6"];
    let mut api = FakeCatalog::default();
    for id in ids {
        api = api.event(id, id, &["s1"]).delay(id, 20);
    }
    let mut config = Config::default();
    config.network.fanout_limit = 2;
    let (api, ctx) = context_with(api, config);

    let nodes = build_event_nodes(&ctx, &season(&ids)).await.unwrap();
    assert_eq!(nodes.len(), 6);
    let max = api.max_in_flight.load(Ordering::SeqCst);
    assert!((1..=2).contains(&max), "max in flight: {}", max);
}

#[tokio::test]
async fn test_live_session_detected_from_homepage() {
    let event_url = "/api/event-occurrence/1050/";
    let api = FakeCatalog::default()
        .homepage_leading_with(event_url)
        .event(event_url, "Monaco", &["s1", "s2", "s3"])
        .session("s1", "Practice 1", SessionStatus::Expired, &[])
        .session("s2", "Race", SessionStatus::Live, &[])
        .session("s3", "Podium", SessionStatus::Live, &[]);
    let (_api, ctx) = context(api);

    let node = detect_live_session(&ctx).await.unwrap().unwrap();
    assert_eq!(node.label, "Race - LIVE");
    assert_eq!(node.style, NodeStyle::Red);
    assert!(!node.expanded);
    assert_eq!(node.child_labels(), ["Main Feed", "(44) driver"]);
}

#[tokio::test]
async fn test_no_live_session() {
    let event_url = "/api/event-occurrence/1050/";
    let api = FakeCatalog::default()
        .homepage_leading_with(event_url)
        .event(event_url, "Monaco", &["s1"])
        .session("s1", "Race", SessionStatus::Replay, &[]);
    let (_api, ctx) = context(api);
    assert!(detect_live_session(&ctx).await.unwrap().is_none());

    let api = FakeCatalog::default().homepage_leading_with("/api/episodes/77/");
    let (_api, ctx) = context(api);
    assert!(detect_live_session(&ctx).await.unwrap().is_none());

    let (_api, ctx) = context(FakeCatalog::default());
    assert!(detect_live_session(&ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn test_archive_categories_and_expansion() {
    let mut api = FakeCatalog::default()
        .episode("a1", "1998 Season Review", "9801review")
        .episode("a2", "2005 Season Review", "2005_review");
    api.vod_types = VodTypeList {
        vod_types: vec![
            VodType {
                name: "Season Review".to_string(),
                content_ids: strings(&["a2", "a1"]),
            },
            VodType {
                name: "Empty".to_string(),
                content_ids: Vec::new(),
            },
        ],
    };
    let (_api, ctx) = context(api);

    let nodes = build_archive_nodes(&ctx).await.unwrap();
    let labels: Vec<_> = nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["Season Review"]);

    let years = load_children(&ctx, &nodes[0].label, nodes[0].payload())
        .await
        .unwrap();
    let labels: Vec<_> = years.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["1998", "2005"]);
}

#[tokio::test]
async fn test_load_children_walks_the_hierarchy() {
    let mut api = FakeCatalog::default()
        .event("e1", "Monaco", &["s1"])
        .session("s1", "Race", SessionStatus::Replay, &[]);
    api.seasons = SeasonList {
        seasons: vec![season(&["e1"])],
    };
    let (api, ctx) = context(api);

    let root = ContentNode::new("Full Race Weekends", Payload::Category(Category::FullRaceWeekends));
    let seasons = load_children(&ctx, &root.label, root.payload()).await.unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0].label, "2021");

    let events = load_children(&ctx, &seasons[0].label, seasons[0].payload())
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].label, "Monaco");

    let event = event_payload("Monaco", &api, "e1");
    let sessions = load_children(&ctx, &event.label, event.payload()).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].label, "Race");

    let feed = &sessions[0].children[0];
    let actions = load_children(&ctx, &feed.label, feed.payload()).await.unwrap();
    let labels: Vec<_> = actions.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["Play with MPV", "Download .m3u8"]);
    assert_eq!(
        actions[0].payload(),
        &Payload::Play("/api/channels/WIF/".to_string())
    );
}
