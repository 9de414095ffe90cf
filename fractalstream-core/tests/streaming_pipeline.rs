use fractalstream_core::{
    Bitmap, ClientConfig, CloseSignal, Connection, ConnectionEvent, Connector, PictureRaster,
    SessionError, SessionId, SessionState, Viewer,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Connector that records which sessions are open.
#[derive(Default)]
struct Loopback {
    open: Rc<RefCell<Vec<SessionId>>>,
    urls: Vec<String>,
}

struct LoopbackConnection {
    id: SessionId,
    open: Rc<RefCell<Vec<SessionId>>>,
}

impl Connection for LoopbackConnection {
    fn close(&mut self) {
        self.open.borrow_mut().retain(|id| *id != self.id);
    }
}

impl Connector for Loopback {
    type Connection = LoopbackConnection;

    fn open(&mut self, session: SessionId, url: &str) -> Result<LoopbackConnection, SessionError> {
        self.open.borrow_mut().push(session);
        self.urls.push(url.to_string());
        Ok(LoopbackConnection {
            id: session,
            open: Rc::clone(&self.open),
        })
    }
}

struct Harness {
    viewer: Viewer<Loopback>,
    raster: Rc<RefCell<Option<PictureRaster>>>,
}

impl Harness {
    fn new() -> Self {
        let mut viewer = Viewer::new(&ClientConfig::default(), Loopback::default());
        let raster = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&raster);
        viewer.on_picture_ready(move |picture| {
            *slot.borrow_mut() = Some(PictureRaster::attach(picture, None));
        });
        let slot = Rc::clone(&raster);
        viewer.on_picture_cleared(move || *slot.borrow_mut() = None);
        Self { viewer, raster }
    }

    fn start(&mut self) -> SessionId {
        let request = ClientConfig::default().default_request().unwrap();
        let id = self.viewer.calculate(&request).unwrap();
        self.viewer.handle_event(id, ConnectionEvent::Opened);
        id
    }

    fn frame(&mut self, id: SessionId, text: &str) {
        self.viewer
            .handle_event(id, ConnectionEvent::Frame(text.to_string()));
    }

    fn has_raster(&self) -> bool {
        self.raster.borrow().is_some()
    }

    fn bitmap(&self) -> Bitmap {
        self.raster
            .borrow()
            .as_ref()
            .map(|raster| raster.bitmap().borrow().clone())
            .unwrap()
    }
}

const SETUP_2X2: &str = r#"{"rowAndColumnCount":2,"tileSize":2,"xOffset":0,"yOffset":0}"#;
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const BLANK: [u8; 4] = [0, 0, 0, 0];

#[test]
fn results_are_drawn_into_their_tile_footprint() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, SETUP_2X2);
    h.frame(id, r#"{"row":0,"column":0,"data":[1,2,3,4]}"#);
    h.frame(id, r#"{"row":1,"column":1,"data":[0,9,0,9]}"#);

    let bitmap = h.bitmap();
    assert_eq!(bitmap.width(), 4);
    // Tile (0, 0) covers x 0..2, y 0..2; every sample escaped.
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(bitmap.pixel(x, y), Some(WHITE));
    }
    // Tile (1, 1) covers x 2..4, y 2..4.
    assert_eq!(bitmap.pixel(2, 2), Some(BLACK));
    assert_eq!(bitmap.pixel(3, 2), Some(WHITE));
    assert_eq!(bitmap.pixel(2, 3), Some(BLACK));
    assert_eq!(bitmap.pixel(3, 3), Some(WHITE));
    // Untouched tiles stay blank.
    assert_eq!(bitmap.pixel(2, 0), Some(BLANK));
    assert_eq!(bitmap.pixel(0, 3), Some(BLANK));

    let picture = h.viewer.picture().borrow();
    assert_eq!(picture.tile(0, 0).unwrap().samples(), &[1, 2, 3, 4]);
    assert!(!picture.tile(0, 1).unwrap().has_data());
    assert!(!picture.tile(1, 0).unwrap().has_data());
}

#[test]
fn result_before_setup_is_dropped_without_crashing() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, r#"{"row":0,"column":0,"data":[0,0,0,0]}"#);

    assert!(!h.viewer.picture().borrow().is_initialized());
    assert!(h.raster.borrow().is_none());
    assert_eq!(h.viewer.session().state(), SessionState::Open);
}

#[test]
fn newer_calculation_supersedes_older_one() {
    let mut h = Harness::new();
    let first = h.start();
    h.frame(first, SETUP_2X2);
    let second = h.start();

    assert_eq!(*h.viewer.session().connector().open.borrow(), vec![second]);

    h.frame(second, r#"{"rowAndColumnCount":1,"tileSize":2,"xOffset":0,"yOffset":0}"#);
    // A late result of the first session addresses a tile the new grid
    // also has; it must not land there.
    h.frame(first, r#"{"row":0,"column":0,"data":[5,5,5,5]}"#);

    let picture = h.viewer.picture().borrow();
    assert_eq!(picture.row_and_column_count(), 1);
    assert!(!picture.tile(0, 0).unwrap().has_data());
}

#[test]
fn normal_close_code_completes_even_if_not_clean() {
    let mut h = Harness::new();
    let completed = Rc::new(RefCell::new(0));
    let c = Rc::clone(&completed);
    h.viewer.on_complete(move || *c.borrow_mut() += 1);
    let failed = Rc::new(RefCell::new(Vec::<String>::new()));
    let f = Rc::clone(&failed);
    h.viewer.on_error(move |reason| f.borrow_mut().push(reason.to_string()));

    let id = h.start();
    h.frame(id, SETUP_2X2);
    h.viewer.handle_event(
        id,
        ConnectionEvent::Closed(CloseSignal::new(1000, false, "")),
    );

    assert_eq!(*completed.borrow(), 1);
    assert!(failed.borrow().is_empty());
    assert_eq!(h.viewer.session().state(), SessionState::Closed);
}

#[test]
fn recoloring_redraws_without_touching_samples() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, SETUP_2X2);
    h.frame(id, r#"{"row":0,"column":1,"data":[0,1,0,1]}"#);
    assert_eq!(h.bitmap().pixel(2, 0), Some(BLACK));

    h.viewer.set_color_scheme("Contrast White");

    let bitmap = h.bitmap();
    assert_eq!(bitmap.pixel(2, 0), Some(WHITE));
    assert_eq!(bitmap.pixel(3, 0), Some(BLACK));
    // Tiles without data render as fully blank.
    assert_eq!(bitmap.pixel(0, 0), Some(BLANK));
    let picture = h.viewer.picture().borrow();
    assert_eq!(picture.tile(0, 1).unwrap().samples(), &[0, 1, 0, 1]);
}

#[test]
fn second_setup_restarts_the_picture() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, SETUP_2X2);
    h.frame(id, r#"{"row":0,"column":0,"data":[1,1,1,1]}"#);
    h.frame(id, r#"{"rowAndColumnCount":3,"tileSize":2,"xOffset":0,"yOffset":0}"#);

    let bitmap = h.bitmap();
    assert_eq!(bitmap.width(), 6);
    assert_eq!(bitmap.pixel(0, 0), Some(BLANK));
    let picture = h.viewer.picture().borrow();
    assert_eq!(picture.tiles().count(), 9);
    assert!(picture.tiles().all(|(_, _, tile)| !tile.has_data()));
}

#[test]
fn new_calculation_drops_previous_picture_and_raster() {
    let mut h = Harness::new();
    let first = h.start();
    h.frame(first, SETUP_2X2);
    h.frame(first, r#"{"row":0,"column":0,"data":[1,2,3,4]}"#);
    assert!(h.has_raster());

    let second = h.start();
    assert!(!h.has_raster());
    assert!(!h.viewer.picture().borrow().is_initialized());

    // The new session ends without ever announcing a grid.
    h.viewer.handle_event(
        second,
        ConnectionEvent::Closed(CloseSignal::new(1000, true, "")),
    );
    assert!(!h.viewer.picture().borrow().is_initialized());
    assert!(!h.has_raster());
}

#[test]
fn oversized_setup_is_dropped_without_panicking() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, r#"{"rowAndColumnCount":1,"tileSize":4294967295,"xOffset":0,"yOffset":0}"#);
    h.frame(id, r#"{"row":0,"column":0,"data":[1]}"#);

    assert!(!h.has_raster());
    assert!(!h.viewer.picture().borrow().is_initialized());
    assert_eq!(h.viewer.session().state(), SessionState::Open);
}

#[test]
fn failed_calculation_clears_picture() {
    let mut h = Harness::new();
    let id = h.start();
    h.frame(id, SETUP_2X2);
    h.viewer.handle_event(
        id,
        ConnectionEvent::Closed(CloseSignal::new(1006, false, "connection lost")),
    );

    assert!(!h.viewer.picture().borrow().is_initialized());
    assert!(!h.has_raster());
    assert_eq!(h.viewer.session().state(), SessionState::ErrorClosed);
}

#[test]
fn request_is_sent_as_query_string() {
    let mut h = Harness::new();
    h.start();
    assert_eq!(
        h.viewer.session().connector().urls,
        vec!["ws://localhost:8080/mandelbrot?width=600&pR=-2.2&pI=-1.4&extent=2.8&iterations=100"]
    );
}
