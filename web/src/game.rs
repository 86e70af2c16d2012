use crate::utils::js_random_seed;
use bitflags::bitflags;
use clap::Args;
use gloo::events::EventListener;
use ninesweep_core as game;
use wasm_bindgen::JsCast;
use yew::prelude::*;

/// Physical key that starts a new board, matched by `KeyboardEvent.code` so it ignores the keyboard layout.
const RESET_KEY_CODE: &str = "KeyR";

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewCellState {
    Hidden,
    Flagged,
    Revealed(u8),
    TriggeredMine,
}

fn cell_state_at(engine: &game::PlayEngine, coords: game::Coord2) -> ViewCellState {
    if engine.triggered_mine() == Some(coords) {
        return ViewCellState::TriggeredMine;
    }

    match engine.cell_at(coords) {
        game::EngineCell::Hidden => ViewCellState::Hidden,
        game::EngineCell::Flagged => ViewCellState::Flagged,
        game::EngineCell::Revealed(count) => ViewCellState::Revealed(count),
    }
}

fn cell_classes(cell_state: ViewCellState) -> Classes {
    use ViewCellState::*;

    classes!(
        "cell",
        match cell_state {
            Hidden => classes!(),
            Flagged => classes!("flag"),
            Revealed(count) => classes!("open", format!("num-{}", count)),
            TriggeredMine => classes!("open", "mine", "oops"),
        }
    )
}

fn cell_label(cell_state: ViewCellState) -> Option<String> {
    match cell_state {
        ViewCellState::Revealed(count) if count > 0 => Some(count.to_string()),
        _ => None,
    }
}

fn board_class(state: game::EngineState) -> &'static str {
    use game::EngineState::*;
    match state {
        Ready | Active => "playable",
        Won => "win",
        Lost => "lose",
    }
}

fn is_reset_key(code: &str, repeat: bool) -> bool {
    !repeat && code == RESET_KEY_CODE
}

pub trait HasUpdate {
    fn has_update(self) -> bool;
}

impl HasUpdate for game::Result<game::MarkOutcome> {
    fn has_update(self) -> bool {
        self.inspect_err(|err| log::debug!("flag rejected: {}", err))
            .is_ok_and(|outcome| outcome.has_update())
    }
}

impl HasUpdate for game::Result<game::RevealOutcome> {
    fn has_update(self) -> bool {
        self.inspect_err(|err| log::debug!("reveal rejected: {}", err))
            .is_ok_and(|outcome| outcome.has_update())
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct CellPointerState {
    pos: game::Coord2,
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellMsg {
    Update(CellPointerState),
    Leave,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum PlayerMove {
    Reveal(game::Coord2),
    ToggleFlag(game::Coord2),
}

/// Feeds one pointer event into the tracked press and returns the move completed by it, if any.
///
/// A move completes when every button is up again; which one it is depends on every button held
/// since the press, so releasing one half of a chord first does not turn it into a single click.
fn track_pointer(current: &mut Option<CellPointerState>, msg: CellMsg) -> Option<PlayerMove> {
    match msg {
        CellMsg::Leave => {
            *current = None;
            None
        }
        CellMsg::Update(next) if next.buttons.is_empty() => {
            let CellPointerState { pos, buttons } = current.take()?;
            match buttons {
                MouseButtons::LEFT => Some(PlayerMove::Reveal(pos)),
                MouseButtons::RIGHT => Some(PlayerMove::ToggleFlag(pos)),
                // chords and other buttons cancel
                _ => None,
            }
        }
        CellMsg::Update(next) => {
            *current = Some(match *current {
                Some(held) if held.pos == next.pos => CellPointerState {
                    pos: next.pos,
                    buttons: held.buttons | next.buttons,
                },
                _ => next,
            });
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    CellEvent(CellMsg),
    Reset,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    x: game::Coord,
    y: game::Coord,
    cell_state: ViewCellState,
    callback: Callback<CellMsg>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        x,
        y,
        cell_state,
        callback,
    } = props.clone();

    let pointer_update = |what: &'static str| {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(CellMsg::Update(CellPointerState {
                pos: (x, y),
                buttons,
            }));
            log::trace!("({}, {}) mouse {} ({:?})", x, y, what, buttons);
        })
    };
    let onmousedown = pointer_update("down");
    let onmouseup = pointer_update("up");
    let onmouseenter = pointer_update("enter");

    let onmouseleave = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            callback.emit(CellMsg::Leave);
            log::trace!("({}, {}) mouse leave", x, y);
        })
    };

    let class = cell_classes(cell_state);
    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}>
            {cell_label(cell_state).unwrap_or_default()}
        </td>
    }
}

/// Where board seeds come from: the browser's RNG, or a fixed seed so a run can be replayed.
#[derive(Copy, Clone, Debug, PartialEq)]
enum SeedSource {
    Random,
    Forced(u64),
}

impl SeedSource {
    fn seed_for(self, game_index: u32) -> u64 {
        match self {
            Self::Random => js_random_seed(),
            Self::Forced(seed) => seed.wrapping_add(game_index.into()),
        }
    }
}

#[derive(Args, Properties, Debug, Clone, Default, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    #[prop_or_default]
    pub(crate) seed: Option<u64>,
}

pub(crate) struct GameView {
    session: game::GameSession,
    seed_source: SeedSource,
    current_cell_state: Option<CellPointerState>,
    _reset_listener: EventListener,
}

impl GameView {
    fn create_reset_listener(ctx: &Context<Self>) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::window(), "keydown", move |event| {
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if is_reset_key(&event.code(), event.repeat()) {
                link.send_message(Msg::Reset);
            }
        })
    }

    fn apply_move(&mut self, player_move: PlayerMove) -> bool {
        match player_move {
            PlayerMove::Reveal(pos) => {
                log::debug!("reveal cell: {:?}", pos);
                let outcome = self.session.reveal(pos);
                if outcome.as_ref().is_ok_and(|outcome| outcome.ends_game()) {
                    log::info!("game over: {:?}", self.session.engine().state());
                }
                outcome.has_update()
            }
            PlayerMove::ToggleFlag(pos) => {
                log::debug!("flag cell: {:?}", pos);
                self.session.toggle_flag(pos).has_update()
            }
        }
    }

    fn reset(&mut self) {
        let seed = self
            .seed_source
            .seed_for(self.session.games_played().saturating_add(1));
        self.session.reset(seed);
        self.current_cell_state = None;
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed_source = ctx
            .props()
            .seed
            .map_or(SeedSource::Random, SeedSource::Forced);
        log::debug!("seed source: {:?}", seed_source);

        Self {
            session: game::GameSession::new(seed_source.seed_for(0)),
            seed_source,
            current_cell_state: None,
            _reset_listener: GameView::create_reset_listener(ctx),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::CellEvent(cell_msg) => {
                log::trace!("cell event: {:?}", cell_msg);
                track_pointer(&mut self.current_cell_state, cell_msg)
                    .is_some_and(|player_move| self.apply_move(player_move))
            }
            Msg::Reset => {
                self.reset();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let engine = self.session.engine();
        let (cols, rows) = engine.size();
        let table_class = board_class(engine.state());
        let banner = self.session.banner();

        html! {
            <div class="ninesweep" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <table class={table_class}>
                    {
                        for (0..rows).map(|y| html! {
                            <tr>
                                {
                                    for (0..cols).map(|x| {
                                        let cell_state = cell_state_at(engine, (x, y));
                                        let callback = ctx.link().callback(Msg::CellEvent);
                                        html! {
                                            <CellView {x} {y} {cell_state} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                if let Some(text) = banner {
                    <p class="banner">{text}</p>
                }
            </div>
        }
    }
}
