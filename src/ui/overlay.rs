//! Overlay window and its message loop
//!
//! One top-level layered window shows the grid. Locked mode renders the
//! background in the color key so only grid, labels and marker remain
//! visible; edit mode switches to whole-window alpha with a regular
//! caption so the window can be moved and resized.
//!
//! The window procedure reaches the `OverlayHost` through GWLP_USERDATA.
//! The host sits in a `RefCell`; a message that arrives while the host is
//! already borrowed (a nested call from inside a Win32 API) falls through
//! to default handling instead of aliasing the state.

use std::cell::RefCell;
use std::ffi::c_void;

use tracing::{debug, error, trace, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, DIB_RGB_COLORS, EndPaint, HDC,
    InvalidateRect, PAINTSTRUCT, SetDIBitsToDevice, UpdateWindow,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWL_EXSTYLE, GWL_STYLE,
    GWLP_USERDATA, GetClientRect, GetMessageW, GetWindowLongPtrW, GetWindowRect, HWND_TOPMOST,
    IDC_ARROW, IDI_APPLICATION, LWA_ALPHA, LWA_COLORKEY, LoadCursorW, LoadIconW, MSG,
    PostQuitMessage, RegisterClassW, SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW,
    SetForegroundWindow, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos,
    SetWindowTextW, TranslateMessage, WINDOW_EX_STYLE, WINDOW_STYLE, WM_COMMAND, WM_DESTROY,
    WM_ERASEBKGND, WM_HOTKEY, WM_KEYDOWN, WM_LBUTTONDOWN, WM_NCDESTROY, WM_PAINT,
    WM_RBUTTONDOWN, WNDCLASSW, WS_CAPTION, WS_EX_LAYERED, WS_EX_TOPMOST, WS_EX_TRANSPARENT,
    WS_POPUP, WS_SIZEBOX, WS_SYSMENU, WS_VISIBLE,
};

use crate::app::surface::Transparency;
use crate::app::{Flow, OverlayController, SurfaceStyle, WindowSurface};
use crate::config::OverlayConfig;
use crate::domain::core::Rect;
use crate::input::events::{command_id, point_from_lparam, tray_notification_code};
use crate::input::{HotkeyModifier, HotkeyRegistration, InputEvent, Key};
use crate::platform::registry::RegistryStore;
use crate::platform::windows::{colorref, to_wide, win32_rect_to_rect};
use crate::ui::renderer::{compute_drawables, to_bgra, FrameRenderer};
use crate::ui::tray::{self, TrayIcon, ID_TRAY_EXIT, ID_TRAY_TOGGLE, WM_TRAY_CALLBACK};

/// Overlay window errors
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to resolve module handle: {0}")]
    ModuleHandleFailed(windows::core::Error),

    #[error("Failed to register overlay window class {class_name}")]
    WindowClassRegistrationFailed { class_name: String },

    #[error("Failed to create overlay window at {rect:?}")]
    WindowCreationFailed { rect: Rect },
}

/// Controller type driving the real overlay
pub type Win32Controller = OverlayController<OverlayWindow, RegistryStore>;

/// The overlay's top-level window
#[derive(Debug)]
pub struct OverlayWindow {
    hwnd: HWND,
}

impl OverlayWindow {
    /// Creates the overlay window in locked mode at `rect`
    ///
    /// The window is created hidden; `show` makes it visible.
    pub fn create(config: &OverlayConfig, rect: Rect) -> Result<Self, OverlayError> {
        let hinstance = unsafe { GetModuleHandleW(None) }.map_err(OverlayError::ModuleHandleFailed)?;
        let class_name = to_wide(config.window_class_name);
        let title = to_wide(config.idle_caption);

        let window_class = WNDCLASSW {
            lpfnWndProc: Some(overlay_window_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hIcon: unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default(),
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            ..Default::default()
        };

        if unsafe { RegisterClassW(&window_class) } == 0 {
            return Err(OverlayError::WindowClassRegistrationFailed {
                class_name: config.window_class_name.to_string(),
            });
        }

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOPMOST,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_POPUP,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                None,
                None,
                hinstance,
                None,
            )
        };

        if hwnd.0 == 0 {
            return Err(OverlayError::WindowCreationFailed { rect });
        }

        let mut window = Self { hwnd };
        window.set_transparency(Transparency::ColorKey(config.color_key));
        debug!(?rect, "overlay window created");
        Ok(window)
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Shows the window top-most at `rect`
    pub fn show(&self, rect: Rect) {
        unsafe {
            if let Err(err) = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_SHOWWINDOW,
            ) {
                warn!(%err, "failed to show overlay window");
            }
            let _ = UpdateWindow(self.hwnd);
        }
    }

    fn set_transparency(&mut self, transparency: Transparency) {
        let result = match transparency {
            Transparency::ColorKey(key) => unsafe {
                SetLayeredWindowAttributes(self.hwnd, colorref(key), 0, LWA_COLORKEY)
            },
            Transparency::Alpha(alpha) => unsafe {
                SetLayeredWindowAttributes(self.hwnd, COLORREF(0), alpha, LWA_ALPHA)
            },
        };

        if let Err(err) = result {
            warn!(?transparency, %err, "failed to configure layered window");
        }
    }
}

impl WindowSurface for OverlayWindow {
    fn apply_style(&mut self, style: &SurfaceStyle) {
        self.set_transparency(style.transparency);

        let base_ex_style = WS_EX_LAYERED | WS_EX_TOPMOST;
        let ex_style: WINDOW_EX_STYLE = if style.click_through {
            base_ex_style | WS_EX_TRANSPARENT
        } else {
            base_ex_style
        };
        let window_style: WINDOW_STYLE = if style.chrome {
            WS_VISIBLE | WS_CAPTION | WS_SYSMENU | WS_SIZEBOX
        } else {
            WS_POPUP | WS_VISIBLE
        };

        unsafe {
            SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, ex_style.0 as isize);
            SetWindowLongPtrW(self.hwnd, GWL_STYLE, window_style.0 as isize);
        }

        let caption = to_wide(style.caption);
        if let Err(err) = unsafe { SetWindowTextW(self.hwnd, PCWSTR(caption.as_ptr())) } {
            warn!(%err, "failed to set window caption");
        }
    }

    fn bring_to_front(&mut self) {
        unsafe {
            if let Err(err) = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_FRAMECHANGED,
            ) {
                warn!(%err, "failed to raise overlay window");
            }
            let _ = SetForegroundWindow(self.hwnd);
        }
    }

    fn window_rect(&self) -> Option<Rect> {
        let mut rect = RECT::default();
        match unsafe { GetWindowRect(self.hwnd, &mut rect) } {
            Ok(()) => Some(win32_rect_to_rect(&rect)),
            Err(err) => {
                warn!(%err, "failed to read window rect");
                None
            }
        }
    }

    fn set_window_rect(&mut self, rect: Rect) {
        if let Err(err) = unsafe {
            SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_FRAMECHANGED,
            )
        } {
            warn!(?rect, %err, "failed to apply window rect");
        }
    }

    fn request_repaint(&mut self) {
        unsafe {
            let _ = InvalidateRect(self.hwnd, None, true);
        }
    }
}

/// Everything the window procedure needs, owned for the window's lifetime
pub struct OverlayHost {
    controller: Win32Controller,
    renderer: FrameRenderer,
    hotkey: Option<HotkeyRegistration>,
    tray: Option<TrayIcon>,
}

impl OverlayHost {
    /// Wraps the controller and installs the global hotkey and tray icon
    ///
    /// Neither is fatal: without the hotkey the tray menu still toggles,
    /// and without the tray the hotkey still works.
    pub fn new(controller: Win32Controller, renderer: FrameRenderer) -> Self {
        let hwnd = controller.surface().hwnd();
        let config = controller.config();

        let hotkey = match HotkeyRegistration::register(
            hwnd,
            config.hotkey_id,
            &[HotkeyModifier::Control, HotkeyModifier::Alt],
            config.hotkey_vk,
        ) {
            Ok(registration) => {
                debug!(id = registration.id(), "toggle hotkey active");
                Some(registration)
            }
            Err(err) => {
                warn!(%err, "toggle hotkey unavailable");
                None
            }
        };

        let tray = match TrayIcon::add(hwnd, config.tray_tooltip) {
            Ok(icon) => Some(icon),
            Err(err) => {
                warn!(%err, "tray icon unavailable");
                None
            }
        };

        Self {
            controller,
            renderer,
            hotkey,
            tray,
        }
    }

    fn hwnd(&self) -> HWND {
        self.controller.surface().hwnd()
    }

    /// Removes the hotkey and the tray icon
    fn release_shell_resources(&mut self) {
        self.hotkey.take();
        self.tray.take();
    }

    fn translate(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<InputEvent> {
        match msg {
            WM_HOTKEY if wparam.0 as i32 == self.controller.config().hotkey_id => {
                Some(InputEvent::Hotkey)
            }
            WM_KEYDOWN => Some(InputEvent::KeyDown(Key::from_vk_code(wparam.0 as u32))),
            WM_LBUTTONDOWN => Some(InputEvent::LeftButtonDown(point_from_lparam(lparam.0))),
            WM_RBUTTONDOWN => Some(InputEvent::RightButtonDown),
            WM_COMMAND => match command_id(wparam.0) {
                ID_TRAY_TOGGLE => Some(InputEvent::TrayToggle),
                ID_TRAY_EXIT => Some(InputEvent::TrayExit),
                _ => None,
            },
            WM_DESTROY => Some(InputEvent::WindowDestroyed),
            _ => None,
        }
    }

    fn paint(&self, hdc: HDC) {
        let mut client = RECT::default();
        if let Err(err) = unsafe { GetClientRect(self.hwnd(), &mut client) } {
            warn!(%err, "failed to read client rect");
            return;
        }

        let width = client.right - client.left;
        let height = client.bottom - client.top;
        let state = self.controller.state();
        let drawables = compute_drawables(
            width,
            height,
            state.mode,
            state.marker,
            self.controller.config(),
        );

        match self.renderer.render(width, height, drawables) {
            Ok(pixmap) => blit(hdc, width, height, &to_bgra(&pixmap)),
            Err(err) => trace!(%err, "nothing to paint"),
        }
    }
}

/// Copies a top-down BGRA frame to the device context at the origin
fn blit(hdc: HDC, width: i32, height: i32, bgra: &[u8]) {
    let info = BITMAPINFO {
        bmiHeader: BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: width,
            biHeight: -height, // Negative for top-down DIB
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        },
        ..Default::default()
    };

    let lines = unsafe {
        SetDIBitsToDevice(
            hdc,
            0,
            0,
            width as u32,
            height as u32,
            0,
            0,
            0,
            height as u32,
            bgra.as_ptr() as *const c_void,
            &info,
            DIB_RGB_COLORS,
        )
    };

    if lines == 0 {
        warn!(width, height, "failed to copy frame to window");
    }
}

/// Runs the message loop until the overlay quits, returning the exit code
///
/// The host is dropped before returning.
pub fn run(host: OverlayHost) -> i32 {
    let hwnd = host.hwnd();
    let initial_rect = host.controller.state().window_rect;
    let host = Box::new(RefCell::new(host));

    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, &*host as *const RefCell<OverlayHost> as isize);
    }
    host.borrow().controller.surface().show(initial_rect);

    let mut msg = MSG::default();
    loop {
        let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if status.0 == -1 {
            error!("message loop failed");
            break;
        }
        if status.0 == 0 {
            break;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // The window may outlive an aborted loop; never leave a dangling pointer behind
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
    }
    drop(host);

    let code = msg.wParam.0 as i32;
    debug!(code, "message loop finished");
    code
}

/// Returns the host attached to `hwnd`, if any
///
/// # Safety
/// The pointer in GWLP_USERDATA must be null or point to the host boxed
/// in `run`, which outlives every message dispatched from its loop.
unsafe fn host_from_hwnd<'a>(hwnd: HWND) -> Option<&'a RefCell<OverlayHost>> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const RefCell<OverlayHost>;
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { &*ptr })
    }
}

/// Routes one message through the controller and acts on the returned flow
///
/// Returns `None` when the message is not ours or the host is busy.
fn dispatch(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<LRESULT> {
    let cell = unsafe { host_from_hwnd(hwnd) }?;
    let Ok(mut host) = cell.try_borrow_mut() else {
        trace!(msg, "re-entrant message, using default handling");
        return None;
    };

    let event = host.translate(msg, wparam, lparam)?;
    if event == InputEvent::WindowDestroyed {
        host.release_shell_resources();
    }
    let flow = host.controller.handle_event(event);
    drop(host);

    // Outside the borrow: both calls dispatch messages back into this window
    match flow {
        Flow::Continue => {}
        Flow::CloseWindow => {
            if let Err(err) = unsafe { DestroyWindow(hwnd) } {
                error!(%err, "failed to destroy overlay window");
            }
        }
        Flow::Quit => unsafe { PostQuitMessage(0) },
    }

    Some(LRESULT(0))
}

unsafe extern "system" fn overlay_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
            if let Some(cell) = unsafe { host_from_hwnd(hwnd) } {
                match cell.try_borrow() {
                    Ok(host) => host.paint(hdc),
                    Err(_) => trace!("paint during state update, skipped"),
                }
            }
            unsafe {
                let _ = EndPaint(hwnd, &ps);
            }
            return LRESULT(0);
        }
        // The frame covers the whole client area
        WM_ERASEBKGND => return LRESULT(1),
        WM_TRAY_CALLBACK => {
            if tray::opens_menu(tray_notification_code(lparam.0)) {
                if let Err(err) = tray::show_context_menu(hwnd) {
                    warn!(%err, "failed to show tray menu");
                }
            }
            return LRESULT(0);
        }
        WM_NCDESTROY => unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
        },
        _ => {}
    }

    if let Some(result) = dispatch(hwnd, msg, wparam, lparam) {
        return result;
    }

    if msg == WM_DESTROY {
        // No host to route through; still end the loop
        unsafe { PostQuitMessage(0) };
        return LRESULT(0);
    }

    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}
