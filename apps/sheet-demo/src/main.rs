use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{bail, Context};
use browsesheet_animation::SpringSpec;
use browsesheet_core::{DefaultScheduler, Runtime};
use browsesheet_foundation::{
    PointerEvent, PointerEventKind, SheetAnchors, SheetConfig, SheetDraggable, SheetState,
    SheetTransform, SheetValue,
};
use browsesheet_ui_graphics::{Density, Offset, Size};

const FRAME_NANOS: u64 = 16_666_667;
const MAX_FRAMES: usize = 600;

/// Drives the runtime like a 60Hz display would.
struct Screen {
    runtime: Runtime,
    state: SheetState,
    size: Size,
    frame: u64,
}

impl Screen {
    fn frame_ms(&self) -> i64 {
        (self.frame * FRAME_NANOS / 1_000_000) as i64
    }

    fn layout(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
        let anchors = SheetAnchors::from_max_height_with(height, self.state.config());
        self.state.on_anchors_changed(anchors);
        log::info!(
            "layout {width}x{height}: anchors {anchors:?}, offset {}",
            self.state.offset()
        );
    }

    fn tick(&mut self) {
        self.frame += 1;
        self.runtime.drain_frame(self.frame * FRAME_NANOS);
        let transform = SheetTransform::from_state(&self.state, self.size);
        log::info!(
            "frame {:>3}: offset {:>7.1} scale {:.3} ({:?})",
            self.frame,
            self.state.offset(),
            transform.scale,
            self.state.current_value()
        );
    }

    fn settle(&mut self) -> anyhow::Result<()> {
        let handle = self.runtime.handle();
        for _ in 0..MAX_FRAMES {
            if !handle.has_frame_callbacks() && !handle.has_pending_tasks() {
                return Ok(());
            }
            self.tick();
        }
        bail!("sheet still moving after {MAX_FRAMES} frames")
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = SheetConfig::default()
        .with_density(Density::new(2.0))
        .with_spring(SpringSpec::default_spring());
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let state = SheetState::with_config(runtime.frame_clock(), config)
        .context("invalid sheet configuration")?;
    let dismissed = Rc::new(Cell::new(false));
    let dismissed_flag = Rc::clone(&dismissed);
    state.set_on_dismiss(move || dismissed_flag.set(true));

    let mut screen = Screen {
        runtime,
        state: state.clone(),
        size: Size::ZERO,
        frame: 0,
    };
    let mut draggable = SheetDraggable::new(state.clone());

    println!("=== Browsesheet demo ===");
    screen.layout(720.0, 1600.0);

    log::info!("swiping up");
    let x = screen.size.width / 2.0;
    let mut y = 900.0;
    draggable.on_pointer_event(
        &PointerEvent::new(PointerEventKind::Down, Offset::new(x, y)).with_uptime(screen.frame_ms()),
    );
    for _ in 0..6 {
        y -= 45.0;
        screen.tick();
        draggable.on_pointer_event(
            &PointerEvent::new(PointerEventKind::Move, Offset::new(x, y))
                .with_uptime(screen.frame_ms()),
        );
    }
    draggable.on_pointer_event(
        &PointerEvent::new(PointerEventKind::Up, Offset::new(x, y)).with_uptime(screen.frame_ms()),
    );
    screen.runtime.handle().drain_ui();
    screen.settle()?;

    log::info!("rotating");
    screen.layout(1600.0, 720.0);

    log::info!("collapsing");
    let collapsing = state.clone();
    screen
        .runtime
        .handle()
        .spawn_ui(async move {
            collapsing.animate_to(SheetValue::Collapsed).await;
        })
        .context("runtime stopped")?;
    screen.runtime.handle().drain_ui();
    screen.settle()?;

    log::info!("dismissing");
    screen
        .runtime
        .handle()
        .spawn_ui(async move {
            state.dismiss().await;
        })
        .context("runtime stopped")?;
    screen.runtime.handle().drain_ui();
    screen.settle()?;

    if !dismissed.get() {
        bail!("sheet did not reach the dismissed anchor");
    }
    println!("Sheet dismissed after {} frames", screen.frame);
    Ok(())
}
