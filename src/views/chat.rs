use crate::views::{escape, layout, Page};

/// Chat room page. The script opens `/ws` and exchanges
/// `{"Message": ...}` / `{"From", "Type", "Message"}` frames.
pub fn index(page: &Page<'_>) -> String {
    let default_name = escape(page.ctx.current_user.as_deref().unwrap_or(""));
    let body = format!(
        r#"<h2>Chat</h2>
<form id="join-form">
  <input type="text" id="username" placeholder="Your name" value="{default_name}">
  <button>Join</button>
</form>
<div id="chat-log"></div>
<form id="chat-form" hidden>
  <input type="text" id="message" autocomplete="off">
  <button>Send</button>
</form>
<script>
(function () {{
  var log = document.getElementById("chat-log");
  var socket = null;

  function append(text, notice) {{
    var line = document.createElement("p");
    if (notice) {{ line.className = "notice"; }}
    line.textContent = text;
    log.appendChild(line);
    log.scrollTop = log.scrollHeight;
  }}

  document.getElementById("join-form").addEventListener("submit", function (e) {{
    e.preventDefault();
    var name = document.getElementById("username").value.trim();
    if (!name || socket) {{ return; }}
    var scheme = location.protocol === "https:" ? "wss://" : "ws://";
    socket = new WebSocket(scheme + location.host + "/ws?username=" + encodeURIComponent(name));
    socket.onopen = function () {{
      document.getElementById("join-form").hidden = true;
      document.getElementById("chat-form").hidden = false;
      append("Connected as " + name, true);
    }};
    socket.onmessage = function (event) {{
      var res = JSON.parse(event.data);
      if (res.Type === "New User") {{
        append(res.From + " joined", true);
      }} else if (res.Type === "Leave") {{
        append(res.From + " left", true);
      }} else {{
        append(res.From + ": " + res.Message, false);
      }}
    }};
    socket.onclose = function () {{
      append("Disconnected", true);
      socket = null;
    }};
  }});

  document.getElementById("chat-form").addEventListener("submit", function (e) {{
    e.preventDefault();
    var input = document.getElementById("message");
    if (!socket || !input.value) {{ return; }}
    socket.send(JSON.stringify({{ Message: input.value }}));
    append("me: " + input.value, false);
    input.value = "";
  }});
}})();
</script>"#
    );
    layout(page, "Chat", &body)
}
